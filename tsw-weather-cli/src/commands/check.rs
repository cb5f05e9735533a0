//! Check command - probe the simulation API without touching the weather.

use std::path::Path;

use tsw_weather::app::LiveApp;
use tsw_weather::config::mask_api_key;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the check command.
pub fn run(config_path: Option<&Path>) -> Result<(), CliError> {
    let runner = CliRunner::new(config_path)?;
    runner.log_startup("check");
    let config = runner.app_config();

    println!("Simulation API: {}", config.simulation.base_url);
    println!("Comm key:       {}", describe_key(config.keys.simulation.as_deref()));
    println!("OpenWeather:    {}", describe_key(config.keys.provider.as_deref()));
    println!();

    let runtime = super::runtime()?;
    let identity = runtime.block_on(LiveApp::probe(&config))?;

    println!("Connected to {}", identity.game_name);
    println!("  Build:       {}", identity.game_build_number);
    println!("  API version: {}", identity.api_version);
    println!("  Instance:    {}", identity.game_instance_id);
    Ok(())
}

fn describe_key(key: Option<&str>) -> String {
    key.map(mask_api_key)
        .unwrap_or_else(|| "not found".to_string())
}
