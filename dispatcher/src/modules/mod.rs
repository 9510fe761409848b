use std::error::Error;
use std::sync::Arc;
use std::thread;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use shared_resources::config::SimulatorConfig;

use crate::utilities::context::DispatcherContext;

pub mod debug;
pub mod network;
pub mod subsystem;

pub fn run(config: SimulatorConfig, console: bool) -> Result<(), Box<dyn Error>> {
    let ctx = Arc::new(DispatcherContext::new(config.num_elevators()));

    // INITIALIZE NETWORK MODULE
    let channels = network::init(&config.network)?;

    // INITIALIZE DISPATCHER LOOPS
    let handles = subsystem::start(
        Arc::clone(&ctx),
        config.num_floors(),
        StdRng::from_entropy(),
        channels,
    )?;

    // INITIALIZE DEBUG MODULE
    if console {
        let ctx = Arc::clone(&ctx);
        thread::Builder::new()
            .name("debug".to_string())
            .spawn(move || debug::main(&ctx))?;
    }

    info!("Dispatcher serving {} elevator(s)", config.num_elevators());
    for handle in handles {
        if handle.join().is_err() {
            ctx.shutdown();
        }
    }
    info!("STOPPING DISPATCHER...");
    Ok(())
}
