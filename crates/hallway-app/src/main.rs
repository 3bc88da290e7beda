mod cli;
mod scenario;
mod settings;
mod sim;

use std::process::ExitCode;

use hallway_config::HallwayConfig;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

const DEMO_SCENARIO: &str = include_str!("../../../scenarios/approach.json");

fn main() -> ExitCode {
    let args = cli::parse();

    // Config comes first so its log level can seed the filter
    let loaded = hallway_config::load_config(args.config.as_deref());
    let configured = loaded
        .as_ref()
        .map(|c| c.logging.level.directive())
        .unwrap_or("hallway=info");
    let log_directive = args.log_level.as_deref().unwrap_or(configured);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| LevelFilter::INFO.into()),
            ),
        )
        .init();

    info!("Hallway starting");

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            HallwayConfig::default()
        }
    };

    if args.print_config {
        println!("{}", hallway_config::config_to_json(&config));
        return ExitCode::SUCCESS;
    }

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path),
        None => Scenario::from_json(DEMO_SCENARIO),
    };
    let scenario = match scenario {
        Ok(scenario) => scenario,
        Err(e) => {
            error!(error = %e, "Failed to read scenario");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        let icebreaker = settings::icebreaker_service(&config.icebreaker);
        scenario::run(scenario, &config, icebreaker).await
    });

    match result {
        Ok(transcript) => {
            for entry in &transcript.roster {
                let status = if entry.online { "online" } else { "offline" };
                println!(
                    "{:>3}  {:<20} {:<8} ({})",
                    entry.initials, entry.name, status, entry.position
                );
            }
            println!();
            for line in &transcript.lines {
                println!("{line}");
            }
            info!(broadcasts = transcript.sent.len(), "Hallway exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Scenario failed");
            ExitCode::FAILURE
        }
    }
}
