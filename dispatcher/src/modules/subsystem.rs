/// ----- DISPATCHER SUBSYSTEM -----
/// The dispatcher's worker loops. Two feed the shared context (floor requests
/// and elevator reports), two drain it (assignments and completion reports).
/// Every loop returns once its channel closes or the context shuts down.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{info, warn};
use rand::rngs::StdRng;

use shared_resources::elevator_message::{AssignedElevatorRequest, ElevatorMessage};
use shared_resources::request::ElevatorRequest;

use crate::utilities::context::DispatcherContext;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Channel ends the dispatcher loops talk through.
pub struct DispatcherChannels {
    pub floor_request_rx: Receiver<ElevatorRequest>,
    pub arrival_rx: Receiver<ElevatorMessage>,
    pub assigned_tx: Sender<AssignedElevatorRequest>,
    pub completed_tx: Sender<ElevatorRequest>,
}

pub fn start(
    ctx: Arc<DispatcherContext>,
    num_floors: u8,
    rng: StdRng,
    channels: DispatcherChannels,
) -> io::Result<Vec<JoinHandle<()>>> {
    let DispatcherChannels {
        floor_request_rx,
        arrival_rx,
        assigned_tx,
        completed_tx,
    } = channels;

    let mut handles = Vec::new();
    {
        let ctx = Arc::clone(&ctx);
        handles.push(
            thread::Builder::new()
                .name("floor_request_receiver".to_string())
                .spawn(move || floor_request_loop(&ctx, num_floors, floor_request_rx))?,
        );
    }
    {
        let ctx = Arc::clone(&ctx);
        handles.push(
            thread::Builder::new()
                .name("elevator_message_receiver".to_string())
                .spawn(move || elevator_message_loop(&ctx, arrival_rx))?,
        );
    }
    {
        let ctx = Arc::clone(&ctx);
        handles.push(
            thread::Builder::new()
                .name("assigner".to_string())
                .spawn(move || assigner_loop(&ctx, rng, assigned_tx))?,
        );
    }
    handles.push(
        thread::Builder::new()
            .name("completed_reporter".to_string())
            .spawn(move || completed_report_loop(&ctx, completed_tx))?,
    );
    Ok(handles)
}

/// Waits for the next message while keeping an eye on shutdown.
fn next<T>(ctx: &DispatcherContext, rx: &Receiver<T>) -> Option<T> {
    while ctx.is_running() {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(message) => return Some(message),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return None,
        }
    }
    None
}

pub fn floor_request_loop(ctx: &DispatcherContext, num_floors: u8, rx: Receiver<ElevatorRequest>) {
    while let Some(request) = next(ctx, &rx) {
        if let Err(e) = request.check_floors(num_floors) {
            warn!("Rejected request {}: {}", request, e);
            continue;
        }
        ctx.add_pending_request(request);
    }
    info!("Floor request stream closed");
}

pub fn elevator_message_loop(ctx: &DispatcherContext, rx: Receiver<ElevatorMessage>) {
    while let Some(message) = next(ctx, &rx) {
        match message {
            ElevatorMessage::Status(status) => {
                if let Err(e) = ctx.update_status(status) {
                    warn!("Dropped status report: {}", e);
                }
            }
            ElevatorMessage::Completed(completed) => {
                info!(
                    "Elevator#{} completed request {}",
                    completed.elevator_id, completed.request
                );
                ctx.add_completed_request(completed.request);
            }
            ElevatorMessage::Returned(requests) => {
                warn!("{} request(s) returned for reassignment", requests.len());
                ctx.return_requests(requests);
            }
        }
    }
    info!("Elevator message stream closed");
}

pub fn assigner_loop(ctx: &DispatcherContext, mut rng: StdRng, tx: Sender<AssignedElevatorRequest>) {
    while ctx.is_running() {
        let Some(assigned) = ctx.assign_next_best_request(&mut rng, POLL_INTERVAL) else {
            continue;
        };
        info!(
            "Assigned request {} to elevator#{}",
            assigned.request, assigned.elevator_id
        );
        if tx.send(assigned).is_err() {
            warn!("No elevators listening for assignments");
            return;
        }
        ctx.on_request_sent();
    }
}

pub fn completed_report_loop(ctx: &DispatcherContext, tx: Sender<ElevatorRequest>) {
    while ctx.is_running() {
        let Some(completed) = ctx.next_completed_request(POLL_INTERVAL) else {
            continue;
        };
        info!("Reporting completed request {}", completed);
        if tx.send(completed).is_err() {
            warn!("No floor subsystem listening for completions");
            return;
        }
        ctx.on_request_sent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use crossbeam_channel::unbounded;
    use rand::SeedableRng;
    use shared_resources::direction::Direction;
    use shared_resources::elevator_message::CompletedElevatorRequest;

    use crate::utilities::state::DispatcherState;

    const WAIT: Duration = Duration::from_secs(2);

    fn request(second: u32, src: u8, dir: Direction, dst: u8) -> ElevatorRequest {
        ElevatorRequest::new(NaiveTime::from_hms_opt(10, 0, second).unwrap(), src, dir, dst)
    }

    #[test]
    fn requests_flow_through_to_assignment_and_report() {
        let ctx = Arc::new(DispatcherContext::new(2));
        let (floor_tx, floor_request_rx) = unbounded();
        let (arrival_tx, arrival_rx) = unbounded();
        let (assigned_tx, assigned_rx) = unbounded();
        let (completed_tx, completed_rx) = unbounded();
        let handles = start(
            Arc::clone(&ctx),
            10,
            StdRng::seed_from_u64(5),
            DispatcherChannels {
                floor_request_rx,
                arrival_rx,
                assigned_tx,
                completed_tx,
            },
        )
        .unwrap();

        let req = request(1, 3, Direction::Up, 5);
        floor_tx.send(request(2, 0, Direction::Up, 5)).unwrap();
        floor_tx.send(req.clone()).unwrap();

        let assigned = assigned_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(assigned.elevator_id, 1);
        assert_eq!(assigned.request, req);

        arrival_tx
            .send(ElevatorMessage::Completed(CompletedElevatorRequest {
                elevator_id: 1,
                request: req.clone(),
            }))
            .unwrap();
        assert_eq!(completed_rx.recv_timeout(WAIT).unwrap(), req);

        // the rejected out-of-range request was never assigned
        assert!(assigned_rx.recv_timeout(Duration::from_millis(200)).is_err());
        assert_eq!(ctx.state(), DispatcherState::Idle);

        ctx.shutdown();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn returned_requests_are_assigned_again() {
        let ctx = DispatcherContext::new(1);
        let (arrival_tx, arrival_rx) = unbounded();
        let req = request(1, 4, Direction::Down, 2);
        arrival_tx.send(ElevatorMessage::Returned(vec![req.clone()])).unwrap();
        drop(arrival_tx);

        elevator_message_loop(&ctx, arrival_rx);
        assert_eq!(ctx.pending_requests(), vec![req]);
    }
}
