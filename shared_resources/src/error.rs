use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("could not resolve {host}:{port}")]
    Unresolvable { host: String, port: u16 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestParseError {
    #[error("expected 4 or 5 fields, found {0}")]
    FieldCount(usize),
    #[error("bad timestamp {0:?}, expected hh:mm:ss.SSS")]
    Timestamp(String),
    #[error("bad floor {0:?}")]
    Floor(String),
    #[error("bad direction {0:?}, expected UP or DOWN")]
    Direction(String),
    #[error("unknown fault tag {0:?}")]
    UnknownFault(String),
    #[error("floor {floor} is outside 1..={num_floors}")]
    FloorOutOfRange { floor: u8, num_floors: u8 },
    #[error("source and destination are both floor {0}")]
    SameFloor(u8),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no elevator with id {id} (have {num_elevators})")]
    UnknownElevator { id: u8, num_elevators: u8 },
}
