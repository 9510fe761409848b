use std::fmt;

/// Where the dispatcher is in its service cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Ready,
    InService,
}

impl DispatcherState {
    pub fn start() -> Self {
        DispatcherState::Idle
    }

    pub fn handle_request_received(self) -> Self {
        match self {
            DispatcherState::Idle => DispatcherState::Ready,
            DispatcherState::Ready | DispatcherState::InService => self,
        }
    }

    /// `drained` tells whether both the pending and the completed queues are
    /// empty after the send. A dispatcher only goes back to idle from service.
    pub fn handle_request_sent(self, drained: bool) -> Self {
        match self {
            DispatcherState::Idle => self,
            DispatcherState::Ready => DispatcherState::InService,
            DispatcherState::InService if drained => DispatcherState::Idle,
            DispatcherState::InService => self,
        }
    }
}

impl fmt::Display for DispatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DispatcherState::Idle => "idle",
            DispatcherState::Ready => "ready",
            DispatcherState::InService => "inService",
        };
        f.pad(s)
    }
}
