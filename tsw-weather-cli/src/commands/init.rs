//! Init command - initialize configuration file.

use std::path::Path;

use tsw_weather::config::ConfigFile;

use crate::error::CliError;
use crate::runner::resolve_config_path;

/// Run the init command.
///
/// Writes a default config file. An existing file is kept unless `force` is set.
pub fn run(config_path: Option<&Path>, force: bool) -> Result<(), CliError> {
    let path = resolve_config_path(config_path);

    if force {
        ConfigFile::default().save_to(&path)?;
        println!("Configuration file reset to defaults: {}", path.display());
    } else if ConfigFile::ensure_exists_at(&path)? {
        println!("Configuration file created: {}", path.display());
    } else {
        println!("Configuration file already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    println!();
    println!("Edit this file to customize the weather sync.");
    println!("Put your OpenWeather API key in [api_keys] openweather,");
    println!("or in a WeatherApiKey.txt file next to the program.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");

        run(Some(&path), false).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_init_keeps_existing_file_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[weather]\nupdate_threshold_km = 2\n").unwrap();

        run(Some(&path), false).unwrap();
        assert_eq!(
            ConfigFile::load_from(&path).unwrap().weather.update_threshold_km,
            2.0
        );

        run(Some(&path), true).unwrap();
        assert_eq!(
            ConfigFile::load_from(&path).unwrap().weather.update_threshold_km,
            10.0
        );
    }
}
