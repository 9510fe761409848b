use std::fs;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

const FALLBACK_FILE_NAME: &str = "_config.json";

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ElevatorConfig {
    pub num_elevators: u8,
    pub num_floors: u8,
}

/// Durations in milliseconds, as they appear in the file.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct TimingConfig {
    pub doors_open_ms: u64,
    pub doors_close_ms: u64,
    pub loading_ms: u64,
    pub moving_ms: u64,
}

impl TimingConfig {
    pub fn doors_open_time(&self) -> Duration {
        Duration::from_millis(self.doors_open_ms)
    }

    pub fn doors_close_time(&self) -> Duration {
        Duration::from_millis(self.doors_close_ms)
    }

    pub fn loading_time(&self) -> Duration {
        Duration::from_millis(self.loading_ms)
    }

    pub fn moving_time(&self) -> Duration {
        Duration::from_millis(self.moving_ms)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    pub dispatcher_host: String,
    pub elevator_host: String,
    pub floor_host: String,
    /// floor -> dispatcher
    pub floor_request_port: u16,
    /// dispatcher -> elevators
    pub pending_request_port: u16,
    /// elevators -> dispatcher
    pub arrival_port: u16,
    /// dispatcher -> floor
    pub completed_port: u16,
}

impl NetworkConfig {
    pub fn floor_request_addr(&self) -> Result<SocketAddr, ConfigError> {
        resolve(&self.dispatcher_host, self.floor_request_port)
    }

    pub fn arrival_addr(&self) -> Result<SocketAddr, ConfigError> {
        resolve(&self.dispatcher_host, self.arrival_port)
    }

    pub fn pending_request_addr(&self) -> Result<SocketAddr, ConfigError> {
        resolve(&self.elevator_host, self.pending_request_port)
    }

    pub fn completed_addr(&self) -> Result<SocketAddr, ConfigError> {
        resolve(&self.floor_host, self.completed_port)
    }

    fn ports(&self) -> [u16; 4] {
        [
            self.floor_request_port,
            self.pending_request_port,
            self.arrival_port,
            self.completed_port,
        ]
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct FloorConfig {
    pub request_interval_ms: u64,
}

impl FloorConfig {
    pub fn request_interval(&self) -> Duration {
        Duration::from_millis(self.request_interval_ms)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub elevator: ElevatorConfig,
    pub timing: TimingConfig,
    pub network: NetworkConfig,
    pub floor: FloorConfig,
    /// Timers record their event but never fire; tests drive timeouts by hand.
    #[serde(default)]
    pub test_mode: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        SimulatorConfig {
            elevator: ElevatorConfig {
                num_elevators: 4,
                num_floors: 22,
            },
            timing: TimingConfig {
                doors_open_ms: 1000,
                doors_close_ms: 1000,
                loading_ms: 2000,
                moving_ms: 1500,
            },
            network: NetworkConfig {
                dispatcher_host: String::from("127.0.0.1"),
                elevator_host: String::from("127.0.0.1"),
                floor_host: String::from("127.0.0.1"),
                floor_request_port: 19735,
                pending_request_port: 19736,
                arrival_port: 19737,
                completed_port: 19738,
            },
            floor: FloorConfig {
                request_interval_ms: 500,
            },
            test_mode: false,
        }
    }
}

impl SimulatorConfig {
    /// Reads the file at `path`, falling back to `_config.json` next to it when
    /// the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let fallback = fallback_path(path);
                log::warn!(
                    "No configuration file at {}, using default settings from {}...",
                    path.display(),
                    fallback.display()
                );
                fs::read_to_string(&fallback).map_err(|source| ConfigError::Io {
                    path: fallback.display().to_string(),
                    source,
                })?
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: SimulatorConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elevator.num_elevators == 0 {
            return Err(ConfigError::Invalid(String::from("num_elevators must be at least 1")));
        }
        if self.elevator.num_floors < 2 {
            return Err(ConfigError::Invalid(String::from("num_floors must be at least 2")));
        }
        let ports = self.network.ports();
        for (i, port) in ports.iter().enumerate() {
            if ports[i + 1..].contains(port) {
                return Err(ConfigError::Invalid(format!("port {} is used by more than one channel", port)));
            }
        }
        Ok(())
    }

    pub fn num_elevators(&self) -> u8 {
        self.elevator.num_elevators
    }

    pub fn num_floors(&self) -> u8 {
        self.elevator.num_floors
    }
}

fn fallback_path(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) => dir.join(FALLBACK_FILE_NAME),
        None => PathBuf::from(FALLBACK_FILE_NAME),
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let unresolvable = || ConfigError::Unresolvable {
        host: host.to_string(),
        port,
    };
    (host, port)
        .to_socket_addrs()
        .map_err(|_| unresolvable())?
        .next()
        .ok_or_else(unresolvable)
}
