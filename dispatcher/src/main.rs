use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use shared_resources::config::SimulatorConfig;
use shared_resources::logging;

#[derive(Parser, Debug)]
#[command(name = "dispatcher", about = "Assigns floor requests to elevator cars")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Draw a live status table of the dispatcher and its cars
    #[arg(long)]
    console: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    logging::init();
    let args = Args::parse();
    let config = SimulatorConfig::load(&args.config)?;
    dispatcher::modules::run(config, args.console)
}
