/// ----- FSM MODULE -----
/// Drives one car. The controller owns the car's context and current state
/// and turns assignments and timer expiries into state transitions. Every
/// handled event ends with a status report to the dispatcher.

use std::time::Instant;

use crossbeam_channel::{select, Receiver};
use log::{debug, info};

use shared_resources::elevator_message::{ElevatorMessage, ElevatorStatus};
use shared_resources::request::ElevatorRequest;

use crate::utilities::context::ElevatorContext;
use crate::utilities::state::ElevatorState;

pub struct ElevatorController {
    ctx: ElevatorContext,
    state: ElevatorState,
}

impl ElevatorController {
    pub fn new(mut ctx: ElevatorContext) -> Self {
        let state = ElevatorState::start(&mut ctx);
        let controller = ElevatorController { ctx, state };
        debug!("{}", controller.ctx);
        controller.notify_status();
        controller
    }

    pub fn on_request_received(&mut self, request: ElevatorRequest) {
        info!(
            "Elevator#{} will handle request going {} from floor {} to floor {} at {}",
            self.ctx.id(),
            request.direction(),
            request.source_floor(),
            request.destination_floor(),
            request.timestamp()
        );
        self.ctx.add_external_request(request.clone());
        let previous = self.state;
        self.state = previous.handle_request_received(&mut self.ctx, &request);
        self.after_event(previous);
    }

    pub fn on_timeout(&mut self) {
        let Some(event) = self.ctx.take_timer() else {
            debug!("Elevator#{} ignoring timeout with no timer armed", self.ctx.id());
            return;
        };
        debug!("Elevator#{} timeout: {}", self.ctx.id(), event);
        let previous = self.state;
        self.state = previous.handle_timeout(&mut self.ctx);
        self.after_event(previous);
    }

    pub fn state(&self) -> ElevatorState {
        self.state
    }

    pub fn context(&self) -> &ElevatorContext {
        &self.ctx
    }

    pub fn status(&self) -> ElevatorStatus {
        ElevatorStatus {
            elevator_id: self.ctx.id(),
            floor: self.ctx.current_floor(),
            direction: self.ctx.direction(),
            state: self.state.kind(),
            fault: self.ctx.fault(),
        }
    }

    pub fn timer_receiver(&self) -> Receiver<Instant> {
        self.ctx.timer().receiver()
    }

    fn after_event(&self, previous: ElevatorState) {
        if previous != self.state {
            debug!(
                "Elevator#{} {} -> {}",
                self.ctx.id(),
                previous.kind(),
                self.state.kind()
            );
        }
        debug!("{}", self.ctx);
        self.notify_status();
    }

    fn notify_status(&self) {
        self.ctx.send(ElevatorMessage::Status(self.status()));
    }
}

pub fn main(mut controller: ElevatorController, assigned_rx: Receiver<ElevatorRequest>) {
    loop {
        let timer_rx = controller.timer_receiver();
        select! {
            recv(assigned_rx) -> msg => {
                match msg {
                    Ok(request) => controller.on_request_received(request),
                    Err(_) => {
                        info!("Elevator#{} no longer receives assignments, stopping", controller.context().id());
                        return;
                    }
                }
            },
            recv(timer_rx) -> _ => {
                controller.on_timeout();
            },
        }
    }
}
