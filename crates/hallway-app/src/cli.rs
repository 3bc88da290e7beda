use std::path::PathBuf;

use clap::Parser;

/// Hallway: proximity-driven presence and communication for a 2D office.
#[derive(Parser, Debug)]
#[command(name = "hallway", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (e.g. debug, hallway=trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Scenario script (JSON) to run. Runs the built-in demo when omitted.
    #[arg(short = 's', long)]
    pub scenario: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
