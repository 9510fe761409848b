/// ----- REQUEST FILE PARSER -----
/// Reads passenger requests, one per line:
/// `hh:mm:ss.SSS <source> <UP|DOWN> <destination> [ELEVATOR_STUCK|DOORS_STUCK]`.
/// Lines that do not parse or name floors outside the building are logged and
/// skipped; the rest are kept in file order.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use thiserror::Error;

use shared_resources::request::ElevatorRequest;

#[derive(Debug, Error)]
pub enum RequestFileError {
    #[error("could not read request file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn read_requests(path: impl AsRef<Path>, num_floors: u8) -> Result<Vec<ElevatorRequest>, RequestFileError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| RequestFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let requests = parse_requests(&contents, num_floors);
    info!("Read {} request(s) from {}", requests.len(), path.display());
    Ok(requests)
}

pub fn parse_requests(contents: &str, num_floors: u8) -> Vec<ElevatorRequest> {
    let mut requests = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed = line
            .parse::<ElevatorRequest>()
            .and_then(|request| request.check_floors(num_floors).map(|_| request));
        match parsed {
            Ok(request) => requests.push(request),
            Err(e) => warn!("Skipping line {}: {} ({})", index + 1, line, e),
        }
    }
    requests
}
