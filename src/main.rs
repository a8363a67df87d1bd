use clap::Parser;
use weather_signal_sim::cli::{run, Cli};
use weather_signal_sim::error::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}
