/// ----- TIMER -----
/// One cancellable single-shot timer per car. The car's event loop selects on
/// `receiver()`; nothing fires unless a timer is armed.

use std::fmt;
use std::time::{Duration, Instant};

use crossbeam_channel::{after, never, Receiver};
use log::debug;

/// What a car expects to do once its timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutEvent {
    DoorsClose,
    StartMotor,
    FloorReached,
    DoorsOpen,
}

impl fmt::Display for TimeoutEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeoutEvent::DoorsClose => "DOORS_CLOSE",
            TimeoutEvent::StartMotor => "START_MOTOR",
            TimeoutEvent::FloorReached => "FLOOR_REACHED",
            TimeoutEvent::DoorsOpen => "DOORS_OPEN",
        };
        f.write_str(s)
    }
}

pub struct StateTimer {
    test_mode: bool,
    pending: Option<TimeoutEvent>,
    fires: Receiver<Instant>,
}

impl StateTimer {
    /// In test mode armed timers are recorded but never fire; the caller
    /// delivers the timeout itself.
    pub fn new(test_mode: bool) -> Self {
        StateTimer {
            test_mode,
            pending: None,
            fires: never(),
        }
    }

    /// Arms the timer. Does nothing if one is already armed: cancel it first.
    pub fn set(&mut self, event: TimeoutEvent, delay: Duration) {
        if let Some(armed) = self.pending {
            debug!("Timer already armed for {}, ignoring {}", armed, event);
            return;
        }
        self.pending = Some(event);
        self.fires = if self.test_mode { never() } else { after(delay) };
    }

    pub fn kill(&mut self) {
        self.pending = None;
        self.fires = never();
    }

    /// Disarms the timer and hands back the event it was armed for.
    pub fn take(&mut self) -> Option<TimeoutEvent> {
        self.fires = never();
        self.pending.take()
    }

    pub fn pending(&self) -> Option<TimeoutEvent> {
        self.pending
    }

    pub fn is_set(&self) -> bool {
        self.pending.is_some()
    }

    pub fn receiver(&self) -> Receiver<Instant> {
        self.fires.clone()
    }
}
