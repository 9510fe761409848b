/// ----- SIMULATOR -----
/// Runs the dispatcher and every car in one process, wired together with
/// channels instead of sockets.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{info, warn};
use rand::rngs::StdRng;

use dispatcher::modules::subsystem::{self as dispatcher_subsystem, DispatcherChannels};
use dispatcher::utilities::context::DispatcherContext;
use elevator::modules::subsystem as elevator_subsystem;
use shared_resources::config::SimulatorConfig;
use shared_resources::elevator_message::ElevatorStatus;
use shared_resources::request::ElevatorRequest;

pub struct Simulation {
    dispatcher: Arc<DispatcherContext>,
    request_tx: Sender<ElevatorRequest>,
    completed_rx: Receiver<ElevatorRequest>,
    handles: Vec<JoinHandle<()>>,
}

impl Simulation {
    pub fn start(config: &SimulatorConfig, rng: StdRng) -> io::Result<Self> {
        let dispatcher = Arc::new(DispatcherContext::new(config.num_elevators()));

        let (events_tx, arrival_rx) = unbounded();
        let cars = elevator_subsystem::start(config, events_tx)?;

        let (assigned_tx, assigned_rx) = unbounded();
        let router = thread::Builder::new()
            .name("router".to_string())
            .spawn(move || elevator_subsystem::route(assigned_rx, cars))?;

        let (request_tx, floor_request_rx) = unbounded();
        let (completed_tx, completed_rx) = unbounded();
        let mut handles = dispatcher_subsystem::start(
            Arc::clone(&dispatcher),
            config.num_floors(),
            rng,
            DispatcherChannels {
                floor_request_rx,
                arrival_rx,
                assigned_tx,
                completed_tx,
            },
        )?;
        handles.push(router);

        info!(
            "Simulation started: {} elevator(s), {} floor(s)",
            config.num_elevators(),
            config.num_floors()
        );
        Ok(Simulation {
            dispatcher,
            request_tx,
            completed_rx,
            handles,
        })
    }

    /// Hands a floor request to the dispatcher.
    pub fn submit(&self, request: ElevatorRequest) -> bool {
        self.request_tx.send(request).is_ok()
    }

    pub fn request_sender(&self) -> Sender<ElevatorRequest> {
        self.request_tx.clone()
    }

    pub fn completions(&self) -> &Receiver<ElevatorRequest> {
        &self.completed_rx
    }

    pub fn statuses(&self) -> Vec<ElevatorStatus> {
        self.dispatcher.statuses()
    }

    pub fn dispatcher(&self) -> &Arc<DispatcherContext> {
        &self.dispatcher
    }

    /// Stops the dispatcher loops; the cars follow once their assignment
    /// stream closes.
    pub fn shutdown(self) {
        self.dispatcher.shutdown();
        for handle in self.handles {
            if handle.join().is_err() {
                warn!("A simulation thread panicked");
            }
        }
    }
}
