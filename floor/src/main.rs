use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use shared_resources::config::SimulatorConfig;
use shared_resources::logging;

#[derive(Parser, Debug)]
#[command(name = "floor", about = "Feeds passenger requests to the dispatcher")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// File with one request per line
    #[arg(short, long, default_value = "requests.txt")]
    requests: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();
    let args = Args::parse();
    let config = SimulatorConfig::load(&args.config)?;
    floor::modules::run(config, &args.requests)
}
