/// ----- ELEVATOR STATE MACHINE -----
/// Each state reacts to two events: a newly assigned request and the expiry of
/// the car's timer. Entering a state performs its entry actions (doors, motor,
/// timer) on the context and yields the new state.

use log::warn;

use shared_resources::direction::Direction;
use shared_resources::elevator_message::ElevatorStateKind;
use shared_resources::request::{ElevatorRequest, Fault};

use super::context::{Door, ElevatorContext, Motor};
use super::timer::TimeoutEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevatorState {
    Idle,
    DoorsOpen,
    DoorsClosed,
    MovingUp,
    MovingDown,
    Stopped,
    HomingDoorsClosed,
    Homing,
    DoorsStuck,
    ElevatorStuck,
}

impl ElevatorState {
    pub fn start(ctx: &mut ElevatorContext) -> Self {
        enter_idle(ctx)
    }

    pub fn kind(&self) -> ElevatorStateKind {
        match self {
            ElevatorState::Idle => ElevatorStateKind::Idle,
            ElevatorState::DoorsOpen => ElevatorStateKind::DoorsOpen,
            ElevatorState::DoorsClosed => ElevatorStateKind::DoorsClosed,
            ElevatorState::MovingUp => ElevatorStateKind::MovingUp,
            ElevatorState::MovingDown => ElevatorStateKind::MovingDown,
            ElevatorState::Stopped => ElevatorStateKind::Stopped,
            ElevatorState::HomingDoorsClosed => ElevatorStateKind::HomingDoorsClosed,
            ElevatorState::Homing => ElevatorStateKind::Homing,
            ElevatorState::DoorsStuck => ElevatorStateKind::DoorsStuck,
            ElevatorState::ElevatorStuck => ElevatorStateKind::ElevatorStuck,
        }
    }

    /// `request` has already been queued for pickup on the context.
    pub fn handle_request_received(self, ctx: &mut ElevatorContext, request: &ElevatorRequest) -> Self {
        match self {
            ElevatorState::Idle => {
                let direction = if request.source_floor() == ctx.current_floor() {
                    request.direction()
                } else {
                    ctx.determine_next_direction()
                };
                ctx.set_direction(direction);
                enter_doors_open(ctx)
            }
            ElevatorState::DoorsOpen => {
                ctx.load_passenger(request);
                self
            }
            ElevatorState::DoorsClosed => {
                if ctx.should_elevator_stop_for(request) {
                    ctx.kill_timer();
                    return enter_doors_open(ctx);
                }
                self
            }
            ElevatorState::MovingUp | ElevatorState::MovingDown => {
                if ctx.should_elevator_stop_for(request) {
                    ctx.kill_timer();
                    return enter_stopped(ctx);
                }
                self
            }
            ElevatorState::ElevatorStuck => {
                ctx.return_external_requests();
                self
            }
            ElevatorState::Stopped
            | ElevatorState::HomingDoorsClosed
            | ElevatorState::Homing
            | ElevatorState::DoorsStuck => self,
        }
    }

    /// The timer has already been disarmed when this runs.
    pub fn handle_timeout(self, ctx: &mut ElevatorContext) -> Self {
        match self {
            ElevatorState::Idle | ElevatorState::ElevatorStuck => self,
            ElevatorState::DoorsOpen => doors_open_timeout(ctx),
            ElevatorState::DoorsClosed => match ctx.direction() {
                Direction::Up => enter_moving(ctx, Direction::Up),
                Direction::Down => enter_moving(ctx, Direction::Down),
                Direction::Idle => enter_idle(ctx),
            },
            ElevatorState::MovingUp | ElevatorState::MovingDown => {
                let travel = if self == ElevatorState::MovingUp {
                    Direction::Up
                } else {
                    Direction::Down
                };
                if !step(ctx, travel) {
                    return enter_stopped(ctx);
                }
                if ctx.should_elevator_stop() {
                    return enter_stopped(ctx);
                }
                ctx.set_timer(TimeoutEvent::FloorReached, ctx.timings().moving_time());
                self
            }
            ElevatorState::Stopped => enter_doors_open(ctx),
            ElevatorState::HomingDoorsClosed => enter_homing(ctx),
            ElevatorState::Homing => {
                let travel = ctx.direction().opposite();
                if !step(ctx, travel) || !ctx.exists_homing_request_beyond(travel) {
                    return enter_stopped(ctx);
                }
                ctx.set_timer(TimeoutEvent::FloorReached, ctx.timings().moving_time());
                self
            }
            ElevatorState::DoorsStuck => {
                ctx.clear_passenger_faults();
                ctx.set_fault(None);
                enter_doors_open(ctx)
            }
        }
    }
}

fn doors_open_timeout(ctx: &mut ElevatorContext) -> ElevatorState {
    match ctx.is_at_error_floor() {
        Some(Fault::ElevatorStuck) => return enter_elevator_stuck(ctx),
        Some(Fault::DoorsStuck) => return enter_doors_stuck(ctx),
        None => {}
    }

    let next_direction = ctx.calculate_next_direction();
    if next_direction == Direction::Idle {
        let homing_direction = ctx.calculate_next_homing_direction();
        if homing_direction != Direction::Idle {
            ctx.set_direction(homing_direction);
            return enter_homing_doors_closed(ctx);
        }
        return enter_idle(ctx);
    }
    if next_direction != ctx.direction() {
        ctx.set_direction(next_direction);
        return enter_doors_open(ctx);
    }
    enter_doors_closed(ctx)
}

/// Moves one floor toward `travel`; false if the shaft ends there.
fn step(ctx: &mut ElevatorContext, travel: Direction) -> bool {
    let moved = match travel {
        Direction::Up => ctx.increment_current_floor(),
        Direction::Down => ctx.decrement_current_floor(),
        Direction::Idle => false,
    };
    if !moved {
        warn!(
            "Elevator#{} cannot move {} from floor {}",
            ctx.id(),
            travel,
            ctx.current_floor()
        );
    }
    moved
}

fn motor_for(travel: Direction) -> Motor {
    match travel {
        Direction::Up => Motor::Up,
        Direction::Down => Motor::Down,
        Direction::Idle => Motor::Idle,
    }
}

fn enter_idle(ctx: &mut ElevatorContext) -> ElevatorState {
    ctx.set_direction(Direction::Idle);
    ctx.set_motor(Motor::Idle);
    ElevatorState::Idle
}

fn enter_doors_open(ctx: &mut ElevatorContext) -> ElevatorState {
    ctx.set_timer(TimeoutEvent::DoorsClose, ctx.timings().loading_time());
    ctx.set_door(Door::Open);
    ctx.load_passengers();
    ctx.unload_passengers();
    ElevatorState::DoorsOpen
}

fn enter_doors_closed(ctx: &mut ElevatorContext) -> ElevatorState {
    ctx.set_door(Door::Closed);
    ctx.set_timer(TimeoutEvent::StartMotor, ctx.timings().doors_close_time());
    ElevatorState::DoorsClosed
}

fn enter_moving(ctx: &mut ElevatorContext, travel: Direction) -> ElevatorState {
    ctx.set_motor(motor_for(travel));
    ctx.set_timer(TimeoutEvent::FloorReached, ctx.timings().moving_time());
    if travel == Direction::Up {
        ElevatorState::MovingUp
    } else {
        ElevatorState::MovingDown
    }
}

fn enter_stopped(ctx: &mut ElevatorContext) -> ElevatorState {
    ctx.set_motor(Motor::Idle);
    ctx.set_timer(TimeoutEvent::DoorsOpen, ctx.timings().doors_open_time());
    ElevatorState::Stopped
}

fn enter_homing_doors_closed(ctx: &mut ElevatorContext) -> ElevatorState {
    ctx.set_door(Door::Closed);
    ctx.set_timer(TimeoutEvent::StartMotor, ctx.timings().doors_close_time());
    ElevatorState::HomingDoorsClosed
}

fn enter_homing(ctx: &mut ElevatorContext) -> ElevatorState {
    ctx.set_motor(motor_for(ctx.direction().opposite()));
    ctx.set_timer(TimeoutEvent::FloorReached, ctx.timings().moving_time());
    ElevatorState::Homing
}

fn enter_doors_stuck(ctx: &mut ElevatorContext) -> ElevatorState {
    warn!("Elevator#{} doors stuck at floor {}", ctx.id(), ctx.current_floor());
    ctx.set_fault(Some(Fault::DoorsStuck));
    ctx.set_timer(TimeoutEvent::DoorsOpen, ctx.timings().doors_open_time());
    ElevatorState::DoorsStuck
}

fn enter_elevator_stuck(ctx: &mut ElevatorContext) -> ElevatorState {
    warn!("Elevator#{} stuck at floor {}", ctx.id(), ctx.current_floor());
    ctx.kill_timer();
    ctx.set_motor(Motor::Idle);
    ctx.set_fault(Some(Fault::ElevatorStuck));
    ctx.return_external_requests();
    ElevatorState::ElevatorStuck
}
