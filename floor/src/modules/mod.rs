use std::error::Error;
use std::path::Path;

use log::info;

use shared_resources::config::SimulatorConfig;

use crate::utilities::parser;

pub mod network;
pub mod subsystem;

pub fn run(config: SimulatorConfig, requests_path: &Path) -> Result<(), Box<dyn Error>> {
    let requests = parser::read_requests(requests_path, config.num_floors())?;

    // INITIALIZE NETWORK MODULE
    let (request_tx, completed_rx) = network::init(&config.network)?;

    let sent = subsystem::feed(&requests, config.floor.request_interval(), &request_tx);
    let completed = subsystem::collect_completions(&completed_rx, sent);

    info!("STOPPING FLOOR SUBSYSTEM: {} of {} request(s) completed", completed.len(), sent);
    Ok(())
}
