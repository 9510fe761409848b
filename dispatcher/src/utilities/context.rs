/// ----- DISPATCHER CONTEXT -----
/// State shared by the dispatcher's threads: the pending and completed
/// queues, one status slot per car and the dispatcher's own service state.
/// Each of them is guarded on its own; a queue insert and the state change it
/// causes happen under the state lock, so a concurrent send cannot slip in
/// between them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};
use rand::Rng;

use shared_resources::elevator_message::{AssignedElevatorRequest, ElevatorStatus};
use shared_resources::error::RegistryError;
use shared_resources::request::ElevatorRequest;
use shared_resources::request_queue::RequestQueue;
use shared_resources::status_registry::StatusRegistry;

use super::assigner;
use super::state::DispatcherState;

pub struct DispatcherContext {
    num_elevators: u8,
    pending: RequestQueue<ElevatorRequest>,
    completed: RequestQueue<ElevatorRequest>,
    registry: StatusRegistry,
    state: Mutex<DispatcherState>,
    running: AtomicBool,
}

impl DispatcherContext {
    pub fn new(num_elevators: u8) -> Self {
        DispatcherContext {
            num_elevators,
            pending: RequestQueue::new(),
            completed: RequestQueue::new(),
            registry: StatusRegistry::new(num_elevators),
            state: Mutex::new(DispatcherState::start()),
            running: AtomicBool::new(true),
        }
    }

    /// Queues a request for assignment unless an equal one is already waiting.
    pub fn add_pending_request(&self, request: ElevatorRequest) -> bool {
        let description = request.to_string();
        let mut state = self.state.lock();
        let added = self.pending.push(request);
        if added {
            info!("Add request {} > pending queue: {}", description, self.pending.len());
            let next = state.handle_request_received();
            transition(&mut state, next);
        } else {
            debug!("Request {} already pending", description);
        }
        added
    }

    pub fn add_completed_request(&self, request: ElevatorRequest) {
        let description = request.to_string();
        let mut state = self.state.lock();
        if self.completed.push(request) {
            info!("Add request {} > completed queue: {}", description, self.completed.len());
            let next = state.handle_request_received();
            transition(&mut state, next);
        }
    }

    /// Puts requests handed back by a faulted car up for assignment again.
    pub fn return_requests(&self, requests: Vec<ElevatorRequest>) {
        for request in requests {
            self.add_pending_request(request);
        }
    }

    pub fn update_status(&self, status: ElevatorStatus) -> Result<(), RegistryError> {
        self.registry.replace(status)
    }

    /// Waits up to `timeout` for pending work, then picks and removes the best
    /// assignment. The caller sends it and reports back with `on_request_sent`.
    pub fn assign_next_best_request<R: Rng>(
        &self,
        rng: &mut R,
        timeout: Duration,
    ) -> Option<AssignedElevatorRequest> {
        if !self.pending.wait_non_empty(timeout) {
            return None;
        }
        let statuses = self.registry.snapshot();
        let num_elevators = self.num_elevators;
        self.pending
            .take_with(|pending| {
                assigner::find_best_assignment(pending, &statuses, num_elevators, rng)
            })
            .map(|(_, assigned)| assigned)
    }

    /// Most recent completion first.
    pub fn next_completed_request(&self, timeout: Duration) -> Option<ElevatorRequest> {
        self.completed.wait_pop_back(timeout)
    }

    pub fn on_request_sent(&self) {
        let mut state = self.state.lock();
        let next = state.handle_request_sent(self.is_drained());
        transition(&mut state, next);
    }

    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.completed.is_empty()
    }

    pub fn state(&self) -> DispatcherState {
        *self.state.lock()
    }

    pub fn num_elevators(&self) -> u8 {
        self.num_elevators
    }

    pub fn pending_requests(&self) -> Vec<ElevatorRequest> {
        self.pending.snapshot()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn statuses(&self) -> Vec<ElevatorStatus> {
        self.registry.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Asks every dispatcher loop to finish its current wait and return.
    pub fn shutdown(&self) {
        if self.running.swap(false, Ordering::Relaxed) {
            warn!("Dispatcher shutting down");
        }
    }
}

fn transition(state: &mut MutexGuard<'_, DispatcherState>, next: DispatcherState) {
    if next != **state {
        debug!("Dispatcher {} -> {}", **state, next);
    }
    **state = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared_resources::direction::Direction;
    use shared_resources::elevator_message::ElevatorStateKind;

    const WAIT: Duration = Duration::from_millis(20);

    fn request(second: u32, src: u8, dir: Direction, dst: u8) -> ElevatorRequest {
        ElevatorRequest::new(NaiveTime::from_hms_opt(9, 0, second).unwrap(), src, dir, dst)
    }

    #[test]
    fn pending_requests_are_deduplicated() {
        let ctx = DispatcherContext::new(2);
        assert!(ctx.add_pending_request(request(1, 2, Direction::Up, 5)));
        assert!(!ctx.add_pending_request(request(1, 2, Direction::Up, 5)));
        assert!(ctx.add_pending_request(request(2, 2, Direction::Up, 5)));
        assert_eq!(ctx.pending_requests().len(), 2);
        assert_eq!(ctx.state(), DispatcherState::Ready);
    }

    #[test]
    fn assignment_removes_the_request_from_pending() {
        let ctx = DispatcherContext::new(2);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(ctx.assign_next_best_request(&mut rng, WAIT), None);

        ctx.add_pending_request(request(1, 3, Direction::Up, 5));
        let assigned = ctx.assign_next_best_request(&mut rng, WAIT).unwrap();
        assert_eq!(assigned.elevator_id, 1);
        assert_eq!(assigned.request, request(1, 3, Direction::Up, 5));
        assert!(ctx.pending_requests().is_empty());
    }

    #[test]
    fn assignment_reads_the_latest_statuses() {
        let ctx = DispatcherContext::new(2);
        ctx.update_status(ElevatorStatus {
            elevator_id: 2,
            floor: 1,
            direction: Direction::Up,
            state: ElevatorStateKind::MovingUp,
            fault: None,
        })
        .unwrap();
        ctx.add_pending_request(request(1, 4, Direction::Up, 6));
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(ctx.assign_next_best_request(&mut rng, WAIT).unwrap().elevator_id, 2);
    }

    #[test]
    fn unknown_cars_cannot_report() {
        let ctx = DispatcherContext::new(2);
        assert!(ctx.update_status(ElevatorStatus::new(5)).is_err());
    }

    #[test]
    fn completed_requests_are_reported_newest_first() {
        let ctx = DispatcherContext::new(1);
        ctx.add_completed_request(request(1, 1, Direction::Up, 2));
        ctx.add_completed_request(request(2, 1, Direction::Up, 3));
        assert_eq!(ctx.next_completed_request(WAIT), Some(request(2, 1, Direction::Up, 3)));
        assert_eq!(ctx.next_completed_request(WAIT), Some(request(1, 1, Direction::Up, 2)));
        assert_eq!(ctx.next_completed_request(WAIT), None);
        assert_eq!(ctx.completed_count(), 0);
    }

    #[test]
    fn returned_requests_go_back_to_pending_once() {
        let ctx = DispatcherContext::new(2);
        ctx.add_pending_request(request(1, 3, Direction::Down, 1));
        ctx.return_requests(vec![request(1, 3, Direction::Down, 1), request(2, 6, Direction::Up, 9)]);
        assert_eq!(
            ctx.pending_requests(),
            vec![request(1, 3, Direction::Down, 1), request(2, 6, Direction::Up, 9)]
        );
    }

    #[test]
    fn goes_idle_once_everything_is_reported() {
        let ctx = DispatcherContext::new(1);
        let mut rng = StdRng::seed_from_u64(3);
        ctx.add_pending_request(request(1, 3, Direction::Up, 5));
        assert_eq!(ctx.state(), DispatcherState::Ready);

        ctx.assign_next_best_request(&mut rng, WAIT).unwrap();
        ctx.on_request_sent();
        assert_eq!(ctx.state(), DispatcherState::InService);

        ctx.add_completed_request(request(1, 3, Direction::Up, 5));
        assert_eq!(ctx.state(), DispatcherState::InService);
        ctx.next_completed_request(WAIT).unwrap();
        ctx.on_request_sent();
        assert_eq!(ctx.state(), DispatcherState::Idle);
    }
}
