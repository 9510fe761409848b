/// ----- NETWORK MODULE -----
/// Receives assignments from the dispatcher and carries every car's reports
/// back to it.

use std::error::Error;
use std::process;
use std::thread::Builder;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::error;
use network_rust::udpnet;

use shared_resources::config::NetworkConfig;
use shared_resources::elevator_message::{AssignedElevatorRequest, ElevatorMessage};

pub fn init(
    network_config: &NetworkConfig,
) -> Result<(Receiver<AssignedElevatorRequest>, Sender<ElevatorMessage>), Box<dyn Error>> {
    let pending_request_addr = network_config.pending_request_addr()?;
    let arrival_addr = network_config.arrival_addr()?;

    let (assigned_tx, assigned_rx) = unbounded::<AssignedElevatorRequest>();
    Builder::new()
        .name("assignment_udp_receiver".to_string())
        .spawn(move || {
            if let Err(e) = udpnet::link::rx(pending_request_addr, assigned_tx) {
                // the receiver only returns when it can no longer do its job
                error!("Assignment link on {} failed: {}", pending_request_addr, e);
                process::exit(1);
            }
        })?;

    let (arrival_tx, arrival_rx) = unbounded::<ElevatorMessage>();
    Builder::new()
        .name("arrival_udp_sender".to_string())
        .spawn(move || {
            if let Err(e) = udpnet::link::tx(arrival_addr, arrival_rx) {
                error!("Arrival link to {} failed: {}", arrival_addr, e);
                process::exit(1);
            }
        })?;

    Ok((assigned_rx, arrival_tx))
}
