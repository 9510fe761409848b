pub mod context;
pub mod debug;
pub mod state;
pub mod timer;
