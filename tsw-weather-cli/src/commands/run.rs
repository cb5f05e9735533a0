//! Run command - keep the simulation's weather in step with the real world.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tsw_weather::app::{AppConfig, LiveApp};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the run command.
///
/// Probes the simulation, registers the subscription, then updates the
/// weather until Ctrl+C is pressed.
pub fn run(config_path: Option<&Path>) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("run");
    let config = runner.app_config();

    print_banner(&config);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    ctrlc::set_handler(move || {
        signal.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let runtime = super::runtime()?;
    runtime.block_on(async {
        let mut app = match LiveApp::start(config, &shutdown).await {
            Ok(app) => app,
            Err(_) if shutdown.is_cancelled() => {
                info!("Shutdown requested during startup");
                println!("Shutting down...");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        println!("Connected. Press Ctrl+C to exit.");

        let outcome = app.run(&shutdown).await;
        if shutdown.is_cancelled() {
            info!("Shutdown requested");
            println!("Shutting down...");
        }

        if let Err(e) = app.shutdown().await {
            warn!(error = %e, "Cleanup failed");
        }
        outcome
    })?;

    Ok(())
}

fn print_banner(config: &AppConfig) {
    println!("TSW Weather v{}", tsw_weather::VERSION);
    println!("Real-time weather sync for Train Sim World 6");
    println!();
    println!("  Simulation:       {}", config.simulation.base_url);
    println!(
        "  Update distance:  {} km",
        config.sync.update_threshold_km
    );
    println!(
        "  Check interval:   {} s",
        config.sync.tick_interval.as_secs()
    );
    println!(
        "  Transition:       {} s",
        config.sync.transition_duration.as_secs()
    );
    for key in config.missing_keys() {
        println!("  Warning: no {} found", key);
    }
    println!();
}
