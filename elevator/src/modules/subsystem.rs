/// ----- ELEVATOR SUBSYSTEM -----
/// Starts one controller thread per car and routes each assignment from the
/// dispatcher to the car it names. All cars report on one shared channel.

use std::io;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{info, warn};

use shared_resources::config::SimulatorConfig;
use shared_resources::elevator_message::{AssignedElevatorRequest, ElevatorMessage};
use shared_resources::request::ElevatorRequest;

use crate::utilities::context::ElevatorContext;

use super::fsm::{self, ElevatorController};

/// Spawns every car. Returns the assignment inbox of each car, ordered by id.
pub fn start(
    config: &SimulatorConfig,
    events_tx: Sender<ElevatorMessage>,
) -> io::Result<Vec<Sender<ElevatorRequest>>> {
    let mut cars = Vec::new();
    for id in 1..=config.num_elevators() {
        let (assigned_tx, assigned_rx) = unbounded();
        let ctx = ElevatorContext::new(id, config, events_tx.clone());
        thread::Builder::new()
            .name(format!("elevator_{}", id))
            .spawn(move || fsm::main(ElevatorController::new(ctx), assigned_rx))?;
        cars.push(assigned_tx);
    }
    info!("Started {} elevator(s)", cars.len());
    Ok(cars)
}

pub fn route(assigned_rx: Receiver<AssignedElevatorRequest>, cars: Vec<Sender<ElevatorRequest>>) {
    for assigned in assigned_rx.iter() {
        let car = (assigned.elevator_id as usize)
            .checked_sub(1)
            .and_then(|index| cars.get(index));
        match car {
            Some(car) => {
                if car.send(assigned.request).is_err() {
                    warn!("Elevator#{} has stopped, dropping its assignment", assigned.elevator_id);
                }
            }
            None => warn!(
                "Assignment for unknown elevator #{} ignored: {}",
                assigned.elevator_id, assigned.request
            ),
        }
    }
    info!("Assignment stream closed");
}
