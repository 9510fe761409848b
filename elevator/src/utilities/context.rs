/// ----- ELEVATOR CONTEXT -----
/// Everything one car knows about itself: position, motor, doors, the
/// passengers it has promised to pick up and the ones it is carrying.
/// Owned by exactly one controller thread.

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use crossbeam_channel::Sender;
use log::{info, warn};

use shared_resources::config::{SimulatorConfig, TimingConfig};
use shared_resources::direction::Direction;
use shared_resources::elevator_message::{CompletedElevatorRequest, ElevatorMessage};
use shared_resources::request::{ElevatorRequest, Fault};

use super::timer::{StateTimer, TimeoutEvent};

const RETURN_BATCH_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motor {
    Idle,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Door {
    Open,
    Closed,
}

pub struct ElevatorContext {
    id: u8,
    num_floors: u8,
    current_floor: u8,
    direction: Direction,
    motor: Motor,
    door: Door,
    external_requests: VecDeque<ElevatorRequest>,
    internal_requests: Vec<ElevatorRequest>,
    button_board: Vec<bool>,
    fault: Option<Fault>,
    timings: TimingConfig,
    timer: StateTimer,
    events_tx: Sender<ElevatorMessage>,
}

impl ElevatorContext {
    pub fn new(id: u8, config: &SimulatorConfig, events_tx: Sender<ElevatorMessage>) -> Self {
        ElevatorContext {
            id,
            num_floors: config.num_floors(),
            current_floor: 1,
            direction: Direction::Idle,
            motor: Motor::Idle,
            door: Door::Open,
            external_requests: VecDeque::new(),
            internal_requests: Vec::new(),
            button_board: vec![false; config.num_floors() as usize],
            fault: None,
            timings: config.timing.clone(),
            timer: StateTimer::new(config.test_mode),
            events_tx,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn current_floor(&self) -> u8 {
        self.current_floor
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn motor(&self) -> Motor {
        self.motor
    }

    pub fn set_motor(&mut self, motor: Motor) {
        self.motor = motor;
    }

    pub fn door(&self) -> Door {
        self.door
    }

    pub fn set_door(&mut self, door: Door) {
        self.door = door;
    }

    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    pub fn set_fault(&mut self, fault: Option<Fault>) {
        self.fault = fault;
    }

    pub fn external_requests(&self) -> impl Iterator<Item = &ElevatorRequest> {
        self.external_requests.iter()
    }

    pub fn internal_requests(&self) -> &[ElevatorRequest] {
        &self.internal_requests
    }

    pub fn timings(&self) -> &TimingConfig {
        &self.timings
    }

    pub fn timer(&self) -> &StateTimer {
        &self.timer
    }

    pub fn set_timer(&mut self, event: TimeoutEvent, delay: Duration) {
        self.timer.set(event, delay);
    }

    pub fn kill_timer(&mut self) {
        self.timer.kill();
    }

    pub fn take_timer(&mut self) -> Option<TimeoutEvent> {
        self.timer.take()
    }

    /// Moves the car one floor up. Refused at the top floor.
    pub fn increment_current_floor(&mut self) -> bool {
        if self.current_floor < self.num_floors {
            self.current_floor += 1;
            return true;
        }
        false
    }

    /// Moves the car one floor down. Refused at the ground floor.
    pub fn decrement_current_floor(&mut self) -> bool {
        if self.current_floor > 1 {
            self.current_floor -= 1;
            return true;
        }
        false
    }

    pub fn add_external_request(&mut self, request: ElevatorRequest) {
        self.external_requests.push_back(request);
    }

    pub fn is_lamp_lit(&self, floor: u8) -> bool {
        floor
            .checked_sub(1)
            .and_then(|i| self.button_board.get(i as usize))
            .copied()
            .unwrap_or(false)
    }

    fn set_lamp(&mut self, floor: u8, lit: bool) {
        if let Some(lamp) = floor
            .checked_sub(1)
            .and_then(|i| self.button_board.get_mut(i as usize))
        {
            *lamp = lit;
        }
    }

    fn lit_floors(&self) -> impl Iterator<Item = u8> + '_ {
        self.button_board
            .iter()
            .enumerate()
            .filter(|(_, lit)| **lit)
            .map(|(i, _)| i as u8 + 1)
    }

    /// Boards everyone waiting at the current floor and presses their buttons.
    pub fn load_passengers(&mut self) {
        let floor = self.current_floor;
        let (boarding, waiting): (Vec<_>, Vec<_>) = self
            .external_requests
            .drain(..)
            .partition(|req| req.source_floor() == floor);
        self.external_requests = waiting.into();
        for req in boarding {
            self.board(req);
        }
    }

    /// Boards a single request if it is waiting at the current floor, whichever
    /// way it is headed.
    pub fn load_passenger(&mut self, request: &ElevatorRequest) -> bool {
        if request.source_floor() != self.current_floor {
            return false;
        }
        match self.external_requests.iter().position(|req| req == request) {
            Some(index) => {
                if let Some(req) = self.external_requests.remove(index) {
                    self.board(req);
                }
                true
            }
            None => false,
        }
    }

    fn board(&mut self, request: ElevatorRequest) {
        self.set_lamp(request.destination_floor(), true);
        self.internal_requests.push(request);
    }

    /// Lets out everyone destined for the current floor, reporting each one as
    /// completed, and clears the floor's lamp.
    pub fn unload_passengers(&mut self) {
        let floor = self.current_floor;
        let (arrived, riding): (Vec<_>, Vec<_>) = self
            .internal_requests
            .drain(..)
            .partition(|req| req.destination_floor() == floor);
        self.internal_requests = riding;
        for req in arrived {
            info!("Elevator#{} completed request {}", self.id, req);
            self.send(ElevatorMessage::Completed(CompletedElevatorRequest {
                elevator_id: self.id,
                request: req,
            }));
        }
        self.set_lamp(floor, false);
    }

    /// Hands every request not yet picked up back to the dispatcher, at most
    /// `RETURN_BATCH_SIZE` per message so each one fits in a single datagram.
    pub fn return_external_requests(&mut self) {
        if self.external_requests.is_empty() {
            return;
        }
        let returned: Vec<_> = self.external_requests.drain(..).collect();
        warn!(
            "Elevator#{} is out of service, returning {} request(s)",
            self.id,
            returned.len()
        );
        for batch in returned.chunks(RETURN_BATCH_SIZE) {
            self.send(ElevatorMessage::Returned(batch.to_vec()));
        }
    }

    /// Drops the fault tags of everyone on board once the fault has been served.
    pub fn clear_passenger_faults(&mut self) {
        for req in self.internal_requests.iter_mut() {
            *req = req.without_fault();
        }
    }

    /// The worst fault carried by a passenger on board. A stuck car wins over
    /// stuck doors.
    pub fn is_at_error_floor(&self) -> Option<Fault> {
        let mut found = None;
        for req in &self.internal_requests {
            match req.fault() {
                Some(Fault::ElevatorStuck) => return Some(Fault::ElevatorStuck),
                Some(Fault::DoorsStuck) => found = Some(Fault::DoorsStuck),
                None => {}
            }
        }
        found
    }

    pub fn calculate_next_direction(&self) -> Direction {
        let up = self.should_continue_sweeping_up();
        let down = self.should_continue_sweeping_down();
        match self.direction {
            Direction::Up if up => Direction::Up,
            Direction::Up if down => Direction::Down,
            Direction::Down if down => Direction::Down,
            Direction::Down if up => Direction::Up,
            Direction::Idle => self.determine_next_direction(),
            _ => Direction::Idle,
        }
    }

    /// Heads toward the oldest request still waiting for pickup.
    pub fn determine_next_direction(&self) -> Direction {
        match self.external_requests.front() {
            Some(next) if next.source_floor() > self.current_floor => Direction::Up,
            Some(next) if next.source_floor() < self.current_floor => Direction::Down,
            _ => Direction::Idle,
        }
    }

    /// Service direction for an empty car that has to reposition. The car
    /// then travels the opposite way until it reaches the far request.
    pub fn calculate_next_homing_direction(&self) -> Direction {
        let above = self.exists_homing_request_above();
        let below = self.exists_homing_request_below();
        match self.direction {
            Direction::Up if above => Direction::Down,
            Direction::Up if below => Direction::Up,
            Direction::Down if below => Direction::Up,
            Direction::Down if above => Direction::Down,
            _ => Direction::Idle,
        }
    }

    /// Whether a homing car travelling `travel` still has its far request ahead.
    pub fn exists_homing_request_beyond(&self, travel: Direction) -> bool {
        match travel {
            Direction::Up => self.exists_homing_request_above(),
            Direction::Down => self.exists_homing_request_below(),
            Direction::Idle => false,
        }
    }

    pub fn should_elevator_stop(&self) -> bool {
        if self.is_lamp_lit(self.current_floor) {
            return true;
        }

        let above = self.exists_sweeping_request_above();
        let below = self.exists_sweeping_request_below();
        let mut intercept = false;
        for req in &self.external_requests {
            if self.should_elevator_stop_for(req) {
                return true;
            }
            if self.internal_requests.is_empty()
                && req.source_floor() == self.current_floor
                && ((!above && self.direction == Direction::Up)
                    || (!below && self.direction == Direction::Down))
            {
                intercept = true;
            }
        }
        intercept
    }

    /// Whether a request arriving now is waiting right here, going our way.
    pub fn should_elevator_stop_for(&self, request: &ElevatorRequest) -> bool {
        request.source_floor() == self.current_floor
            && (request.direction() == self.direction || self.direction == Direction::Idle)
    }

    fn should_continue_sweeping_up(&self) -> bool {
        self.lit_floors().any(|floor| floor > self.current_floor)
            || self.exists_sweeping_request_above()
    }

    fn should_continue_sweeping_down(&self) -> bool {
        self.lit_floors().any(|floor| floor < self.current_floor)
            || self.exists_sweeping_request_below()
    }

    fn exists_sweeping_request_above(&self) -> bool {
        self.external_requests
            .iter()
            .any(|req| req.source_floor() > self.current_floor && req.direction() == Direction::Up)
    }

    fn exists_sweeping_request_below(&self) -> bool {
        self.external_requests
            .iter()
            .any(|req| req.source_floor() < self.current_floor && req.direction() == Direction::Down)
    }

    fn exists_homing_request_above(&self) -> bool {
        self.external_requests
            .iter()
            .any(|req| req.source_floor() > self.current_floor && req.direction() == Direction::Down)
    }

    fn exists_homing_request_below(&self) -> bool {
        self.external_requests
            .iter()
            .any(|req| req.source_floor() < self.current_floor && req.direction() == Direction::Up)
    }

    pub fn send(&self, message: ElevatorMessage) {
        if self.events_tx.send(message).is_err() {
            warn!("Elevator#{} has no one listening for its reports", self.id);
        }
    }
}

impl fmt::Display for ElevatorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Elevator#{} {{floor: {}, direction: {}, motor: {:?}, door: {:?}}} waiting: [",
            self.id, self.current_floor, self.direction, self.motor, self.door
        )?;
        for req in &self.external_requests {
            write!(f, "{}, ", req)?;
        }
        write!(f, "] carrying: [")?;
        for req in &self.internal_requests {
            write!(f, "{}, ", req)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveTime;
    use crossbeam_channel::{unbounded, Receiver};

    pub(crate) fn test_config(num_floors: u8) -> SimulatorConfig {
        let mut config = SimulatorConfig::default();
        config.elevator.num_floors = num_floors;
        config.test_mode = true;
        config
    }

    pub(crate) fn request(second: u32, src: u8, dir: Direction, dst: u8) -> ElevatorRequest {
        let timestamp = NaiveTime::from_hms_opt(7, 0, second).unwrap();
        ElevatorRequest::new(timestamp, src, dir, dst)
    }

    fn context(num_floors: u8) -> (ElevatorContext, Receiver<ElevatorMessage>) {
        let (tx, rx) = unbounded();
        (ElevatorContext::new(1, &test_config(num_floors), tx), rx)
    }

    fn move_to(ctx: &mut ElevatorContext, floor: u8) {
        while ctx.current_floor() < floor {
            assert!(ctx.increment_current_floor());
        }
        while ctx.current_floor() > floor {
            assert!(ctx.decrement_current_floor());
        }
    }

    #[test]
    fn floor_changes_stay_inside_the_shaft() {
        let (mut ctx, _rx) = context(3);
        assert!(!ctx.decrement_current_floor());
        assert_eq!(ctx.current_floor(), 1);
        assert!(ctx.increment_current_floor());
        assert!(ctx.increment_current_floor());
        assert!(!ctx.increment_current_floor());
        assert_eq!(ctx.current_floor(), 3);
    }

    #[test]
    fn loading_boards_everyone_at_the_floor() {
        let (mut ctx, _rx) = context(10);
        move_to(&mut ctx, 3);
        ctx.add_external_request(request(1, 3, Direction::Up, 5));
        ctx.add_external_request(request(2, 3, Direction::Down, 1));
        ctx.add_external_request(request(3, 6, Direction::Down, 2));

        ctx.load_passengers();

        assert!(ctx.external_requests().all(|req| req.source_floor() != 3));
        assert_eq!(ctx.internal_requests().len(), 2);
        assert!(ctx.is_lamp_lit(5));
        assert!(ctx.is_lamp_lit(1));
        assert!(!ctx.is_lamp_lit(2));
    }

    #[test]
    fn single_boarding_ignores_direction_but_not_floor() {
        let (mut ctx, _rx) = context(10);
        ctx.set_direction(Direction::Up);
        let here = request(1, 1, Direction::Up, 4);
        let elsewhere = request(2, 2, Direction::Up, 4);
        ctx.add_external_request(here.clone());
        ctx.add_external_request(elsewhere.clone());

        assert!(!ctx.load_passenger(&elsewhere));
        assert!(ctx.load_passenger(&here));
        assert_eq!(ctx.internal_requests(), &[here]);
        assert!(ctx.is_lamp_lit(4));
    }

    #[test]
    fn unloading_reports_each_arrival_once() {
        let (mut ctx, rx) = context(10);
        ctx.add_external_request(request(1, 1, Direction::Up, 4));
        ctx.add_external_request(request(2, 1, Direction::Up, 6));
        ctx.load_passengers();
        move_to(&mut ctx, 4);

        ctx.unload_passengers();

        let completed: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            completed,
            vec![ElevatorMessage::Completed(CompletedElevatorRequest {
                elevator_id: 1,
                request: request(1, 1, Direction::Up, 4),
            })]
        );
        assert_eq!(ctx.internal_requests(), &[request(2, 1, Direction::Up, 6)]);
        assert!(!ctx.is_lamp_lit(4));
        assert!(ctx.is_lamp_lit(6));
    }

    #[test]
    fn stops_whenever_the_floor_lamp_is_lit() {
        let (mut ctx, _rx) = context(10);
        ctx.add_external_request(request(1, 1, Direction::Up, 5));
        ctx.load_passengers();
        for direction in [Direction::Up, Direction::Down, Direction::Idle] {
            ctx.set_direction(direction);
            move_to(&mut ctx, 5);
            assert!(ctx.should_elevator_stop());
            move_to(&mut ctx, 4);
            assert!(!ctx.should_elevator_stop());
        }
    }

    #[test]
    fn stops_for_requests_going_the_same_way() {
        let (mut ctx, _rx) = context(10);
        ctx.set_direction(Direction::Up);
        ctx.add_external_request(request(1, 1, Direction::Up, 8));
        ctx.load_passengers();
        ctx.add_external_request(request(2, 3, Direction::Down, 1));
        ctx.add_external_request(request(3, 4, Direction::Up, 7));

        move_to(&mut ctx, 3);
        assert!(!ctx.should_elevator_stop());
        move_to(&mut ctx, 4);
        assert!(ctx.should_elevator_stop());
    }

    #[test]
    fn empty_car_intercepts_when_nothing_lies_ahead() {
        let (mut ctx, _rx) = context(10);
        ctx.set_direction(Direction::Up);
        ctx.add_external_request(request(1, 3, Direction::Down, 1));
        move_to(&mut ctx, 3);
        assert!(ctx.should_elevator_stop());

        ctx.add_external_request(request(2, 6, Direction::Up, 9));
        assert!(!ctx.should_elevator_stop());
    }

    #[test]
    fn single_request_stop_check() {
        let (mut ctx, _rx) = context(10);
        move_to(&mut ctx, 4);
        ctx.set_direction(Direction::Down);
        assert!(ctx.should_elevator_stop_for(&request(1, 4, Direction::Down, 1)));
        assert!(!ctx.should_elevator_stop_for(&request(2, 4, Direction::Up, 9)));
        assert!(!ctx.should_elevator_stop_for(&request(3, 5, Direction::Down, 1)));
        ctx.set_direction(Direction::Idle);
        assert!(ctx.should_elevator_stop_for(&request(4, 4, Direction::Up, 9)));
    }

    #[test]
    fn next_direction_keeps_sweeping_then_reverses() {
        let (mut ctx, _rx) = context(10);
        move_to(&mut ctx, 5);
        ctx.set_direction(Direction::Up);
        ctx.add_external_request(request(1, 7, Direction::Up, 9));
        ctx.add_external_request(request(2, 2, Direction::Down, 1));
        assert_eq!(ctx.calculate_next_direction(), Direction::Up);

        ctx.set_direction(Direction::Down);
        assert_eq!(ctx.calculate_next_direction(), Direction::Down);

        ctx.set_direction(Direction::Idle);
        assert_eq!(ctx.calculate_next_direction(), Direction::Up);
    }

    #[test]
    fn next_direction_is_idle_without_sweeping_work() {
        let (mut ctx, _rx) = context(10);
        move_to(&mut ctx, 5);
        ctx.set_direction(Direction::Up);
        ctx.add_external_request(request(1, 8, Direction::Down, 2));
        assert_eq!(ctx.calculate_next_direction(), Direction::Idle);
        assert_eq!(ctx.calculate_next_homing_direction(), Direction::Down);
    }

    #[test]
    fn homing_finds_upward_requests_below_the_car() {
        // Every floor pair with an UP request below the car must yield a homing
        // direction, otherwise the request would never be served.
        for car in 2..=10u8 {
            for src in 1..car {
                let (mut ctx, _rx) = context(10);
                move_to(&mut ctx, car);
                ctx.add_external_request(request(1, src, Direction::Up, 10));
                for direction in [Direction::Up, Direction::Down] {
                    ctx.set_direction(direction);
                    assert_eq!(ctx.calculate_next_homing_direction(), Direction::Up);
                    assert!(ctx.exists_homing_request_beyond(Direction::Up.opposite()));
                }
            }
        }
    }

    #[test]
    fn homing_is_idle_when_the_car_is_idle() {
        let (mut ctx, _rx) = context(10);
        move_to(&mut ctx, 5);
        ctx.add_external_request(request(1, 8, Direction::Down, 2));
        assert_eq!(ctx.calculate_next_homing_direction(), Direction::Idle);
    }

    #[test]
    fn stuck_car_outranks_stuck_doors() {
        let (mut ctx, _rx) = context(10);
        ctx.add_external_request(request(1, 1, Direction::Up, 3).with_fault(Fault::DoorsStuck));
        ctx.load_passengers();
        assert_eq!(ctx.is_at_error_floor(), Some(Fault::DoorsStuck));

        ctx.add_external_request(request(2, 1, Direction::Up, 4).with_fault(Fault::ElevatorStuck));
        ctx.load_passengers();
        assert_eq!(ctx.is_at_error_floor(), Some(Fault::ElevatorStuck));

        ctx.clear_passenger_faults();
        assert_eq!(ctx.is_at_error_floor(), None);
    }

    #[test]
    fn returning_requests_empties_the_pickup_list() {
        let (mut ctx, rx) = context(10);
        ctx.return_external_requests();
        assert!(rx.try_recv().is_err());

        ctx.add_external_request(request(1, 4, Direction::Up, 6));
        ctx.return_external_requests();
        assert_eq!(
            rx.try_recv().unwrap(),
            ElevatorMessage::Returned(vec![request(1, 4, Direction::Up, 6)])
        );
        assert_eq!(ctx.external_requests().count(), 0);
    }

    #[test]
    fn long_return_lists_are_split_into_batches() {
        let (mut ctx, rx) = context(40);
        let waiting: Vec<_> = (0..RETURN_BATCH_SIZE as u32 * 2 + 3)
            .map(|second| request(second, 2 + (second % 30) as u8, Direction::Up, 40))
            .collect();
        for req in &waiting {
            ctx.add_external_request(req.clone());
        }

        ctx.return_external_requests();

        let batches: Vec<Vec<ElevatorRequest>> = rx
            .try_iter()
            .map(|message| match message {
                ElevatorMessage::Returned(batch) => batch,
                other => panic!("unexpected message {:?}", other),
            })
            .collect();
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|batch| batch.len() <= RETURN_BATCH_SIZE));
        assert_eq!(batches.concat(), waiting);
        assert_eq!(ctx.external_requests().count(), 0);
    }
}
