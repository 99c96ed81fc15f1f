use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sample for a while and print readings and statistics (default)
    #[command(alias = "mon")]
    Monitor {
        /// Sampling frequency in Hz
        #[arg(short, long)]
        frequency: Option<i32>,

        /// Monitoring duration in seconds
        #[arg(short, long)]
        duration: Option<u64>,
    },

    /// Print one JSON document per interval
    #[command(alias = "raw")]
    Pipe {
        /// Number of documents to print (0 = until interrupted)
        #[arg(short, long, default_value_t = 0)]
        samples: u32,

        /// Interval between documents in milliseconds
        #[arg(short, long, default_value_t = 1000)]
        interval: u64,

        /// Single-line JSON
        #[arg(short, long)]
        compact: bool,
    },

    /// List discovered sensors
    #[command(alias = "ls")]
    Sensors,

    /// Show or reset the configuration file
    Config {
        #[arg(long)]
        path: bool,

        #[arg(long)]
        reset: bool,
    },
}

#[derive(Debug, Parser)]
#[command(name = "pwmon", version, about = "Power telemetry for embedded Linux boards")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also write logs to a daily rotating file
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Use the fake sysfs roots and placeholder sensors
    #[arg(long, global = true)]
    pub testing: bool,

    /// Synthesize readings instead of reading hardware
    #[arg(long, global = true)]
    pub simulate: bool,
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
    fn test_parse_monitor_args() {
        let cli = Cli::parse_from(["pwmon", "monitor", "-f", "20", "-d", "3", "--testing"]);
        assert!(cli.testing);
        match cli.command {
            Some(Commands::Monitor {
                frequency,
                duration,
            }) => {
                assert_eq!(frequency, Some(20));
                assert_eq!(duration, Some(3));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_negative_frequency_reaches_engine() {
        let cli = Cli::parse_from(["pwmon", "monitor", "--frequency=-5"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Monitor {
                frequency: Some(-5),
                ..
            })
        ));
    }
}
