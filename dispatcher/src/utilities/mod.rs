pub mod assigner;
pub mod context;
pub mod debug;
pub mod state;
