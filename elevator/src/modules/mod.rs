use std::error::Error;
use std::thread;

use crossbeam_channel::unbounded;
use log::{error, info, warn};

use shared_resources::config::SimulatorConfig;
use shared_resources::elevator_message::ElevatorMessage;

use crate::utilities::debug::Debug;

pub mod fsm;
pub mod network;
pub mod subsystem;

pub fn run(config: SimulatorConfig, console: bool) -> Result<(), Box<dyn Error>> {
    // INITIALIZE NETWORK MODULE
    let (assigned_rx, arrival_tx) = network::init(&config.network)?;

    // INITIALIZE CARS
    let (events_tx, events_rx) = unbounded::<ElevatorMessage>();
    let cars = subsystem::start(&config, events_tx)?;

    // INITIALIZE ROUTER
    thread::Builder::new()
        .name("router".to_string())
        .spawn(move || subsystem::route(assigned_rx, cars))?;

    let mut debug = console.then(|| Debug::new(config.num_elevators()));

    for message in events_rx.iter() {
        if let (Some(debug), ElevatorMessage::Status(status)) = (debug.as_mut(), &message) {
            if let Err(e) = debug.printstatus(status) {
                warn!("Unable to draw status console: {}", e);
            }
        }
        if arrival_tx.send(message).is_err() {
            error!("Arrival link closed");
            break;
        }
    }

    info!("STOPPING ELEVATOR SUBSYSTEM...");
    Ok(())
}
