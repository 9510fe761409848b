use std::fmt;

use crate::direction::Direction;
use crate::request::{ElevatorRequest, Fault};

/// State tag a car reports alongside its position.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElevatorStateKind {
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

impl ElevatorStateKind {
    pub fn as_string(&self) -> String {
        match self {
            ElevatorStateKind::Idle => String::from("idle"),
            ElevatorStateKind::DoorsOpen => String::from("doorsOpen"),
            ElevatorStateKind::DoorsClosed => String::from("doorsClosed"),
            ElevatorStateKind::MovingUp => String::from("movingUp"),
            ElevatorStateKind::MovingDown => String::from("movingDown"),
            ElevatorStateKind::Stopped => String::from("stopped"),
            ElevatorStateKind::HomingDoorsClosed => String::from("homingClosed"),
            ElevatorStateKind::Homing => String::from("homing"),
            ElevatorStateKind::DoorsStuck => String::from("doorsStuck"),
            ElevatorStateKind::ElevatorStuck => String::from("stuck"),
        }
    }

    pub fn is_stuck(&self) -> bool {
        matches!(self, ElevatorStateKind::DoorsStuck | ElevatorStateKind::ElevatorStuck)
    }
}

impl fmt::Display for ElevatorStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Snapshot of one car as last reported to the dispatcher.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct ElevatorStatus {
    pub elevator_id: u8,
    pub floor: u8,
    pub direction: Direction,
    pub state: ElevatorStateKind,
    pub fault: Option<Fault>,
}

impl ElevatorStatus {
    /// Status of a car that has not reported yet: parked idle on the ground floor.
    pub fn new(elevator_id: u8) -> Self {
        ElevatorStatus {
            elevator_id,
            floor: 1,
            direction: Direction::Idle,
            state: ElevatorStateKind::Idle,
            fault: None,
        }
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some() || self.state.is_stuck()
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct AssignedElevatorRequest {
    pub elevator_id: u8,
    pub request: ElevatorRequest,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub struct CompletedElevatorRequest {
    pub elevator_id: u8,
    pub request: ElevatorRequest,
}

/// Everything a car reports back to the dispatcher.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
pub enum ElevatorMessage {
    Status(ElevatorStatus),
    Completed(CompletedElevatorRequest),
    Returned(Vec<ElevatorRequest>),
}
