pub mod config;
pub mod direction;
pub mod elevator_message;
pub mod error;
pub mod logging;
pub mod request;
pub mod request_queue;
pub mod status_registry;
pub mod status_table;
