mod cli;
mod commands;
mod config;
mod logging;
mod render;

use clap::Parser;
use color_eyre::eyre::Result;

use cli::{Cli, Commands};
use config::{LogLevel, UserConfig};
use tracing::info;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = UserConfig::load();
    let log_level = cli
        .log_level
        .as_deref()
        .map_or(config.log_level, LogLevel::from_str);
    let log_guard = logging::init(log_level, cli.log_file);
    if log_guard.is_file_backed() {
        info!(dir = %logging::log_dir().display(), "Mirroring logs to file");
    }

    let monitor_config = config.monitor_config(cli.testing, cli.simulate);

    match cli.command {
        Some(Commands::Monitor {
            frequency,
            duration,
        }) => {
            let frequency = frequency.unwrap_or(config.frequency_hz as i32);
            let duration = duration.unwrap_or(config.duration_secs);
            commands::monitor::run(monitor_config, frequency, duration)?;
        }
        Some(Commands::Pipe {
            samples,
            interval,
            compact,
        }) => {
            commands::pipe::run(monitor_config, samples, interval, compact)?;
        }
        Some(Commands::Sensors) => {
            commands::sensors::run(monitor_config)?;
        }
        Some(Commands::Config { path, reset }) => {
            commands::config::run(path, reset, &monitor_config)?;
        }
        None => {
            commands::monitor::run(
                monitor_config,
                config.frequency_hz as i32,
                config.duration_secs,
            )?;
        }
    }

    Ok(())
}
