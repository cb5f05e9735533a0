//! TSW Weather CLI - Command-line interface
//!
//! This binary provides a command-line interface to the tsw-weather library.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tsw-weather")]
#[command(version = tsw_weather::VERSION)]
#[command(about = "Real-world weather for Train Sim World, following your train", long_about = None)]
struct Cli {
    /// Path to the configuration file (default: ~/.tsw-weather/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync the simulation's weather until Ctrl+C (default)
    Run,
    /// Check that the simulation API is reachable and print its identity
    Check,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(config),
        Commands::Check => commands::check::run(config),
        Commands::Init { force } => commands::init::run(config, force),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["tsw-weather"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["tsw-weather", "init", "--force", "--config", "/tmp/c.ini"])
                .unwrap();
        assert!(matches!(cli.command, Some(Commands::Init { force: true })));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.ini")));
    }
}
