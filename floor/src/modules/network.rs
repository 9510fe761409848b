/// ----- NETWORK MODULE -----
/// Sends floor requests to the dispatcher and receives its completion reports.

use std::error::Error;
use std::process;
use std::thread::Builder;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::error;
use network_rust::udpnet;

use shared_resources::config::NetworkConfig;
use shared_resources::request::ElevatorRequest;

pub fn init(
    network_config: &NetworkConfig,
) -> Result<(Sender<ElevatorRequest>, Receiver<ElevatorRequest>), Box<dyn Error>> {
    let floor_request_addr = network_config.floor_request_addr()?;
    let completed_addr = network_config.completed_addr()?;

    let (request_tx, request_rx) = unbounded::<ElevatorRequest>();
    Builder::new()
        .name("floor_request_udp_sender".to_string())
        .spawn(move || {
            if let Err(e) = udpnet::link::tx(floor_request_addr, request_rx) {
                error!("Floor request link to {} failed: {}", floor_request_addr, e);
                process::exit(1);
            }
        })?;

    let (completed_tx, completed_rx) = unbounded::<ElevatorRequest>();
    Builder::new()
        .name("completed_udp_receiver".to_string())
        .spawn(move || {
            if let Err(e) = udpnet::link::rx(completed_addr, completed_tx) {
                error!("Completion link on {} failed: {}", completed_addr, e);
                process::exit(1);
            }
        })?;

    Ok((request_tx, completed_rx))
}
