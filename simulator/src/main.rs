use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use floor::modules::subsystem as floor_subsystem;
use floor::utilities::parser;
use shared_resources::config::SimulatorConfig;
use shared_resources::logging;
use simulator::Simulation;

#[derive(Parser, Debug)]
#[command(name = "simulator", about = "Runs the whole building in one process")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// File with one request per line
    #[arg(short, long, default_value = "requests.txt")]
    requests: PathBuf,

    /// Draw a live status table of the dispatcher and its cars
    #[arg(long)]
    console: bool,

    /// Seed for the dispatcher's fallback choice
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();
    let args = Args::parse();
    let config = SimulatorConfig::load(&args.config)?;
    let requests = parser::read_requests(&args.requests, config.num_floors())?;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let simulation = Simulation::start(&config, rng)?;

    if args.console {
        let ctx = Arc::clone(simulation.dispatcher());
        thread::Builder::new()
            .name("debug".to_string())
            .spawn(move || dispatcher::modules::debug::main(&ctx))?;
    }

    let sent = floor_subsystem::feed(
        &requests,
        config.floor.request_interval(),
        &simulation.request_sender(),
    );
    floor_subsystem::collect_completions(simulation.completions(), sent);

    simulation.shutdown();
    Ok(())
}
