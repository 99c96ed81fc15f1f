use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use pwmon_engine::MonitorConfig;
use tracing::info;

use crate::commands::{interrupt_channel, open_monitor};
use crate::render::{format_snapshot, format_statistics};

const STATS_EVERY_SECS: u64 = 5;

pub fn run(config: MonitorConfig, frequency: i32, duration: u64) -> Result<()> {
    println!("Initializing power monitor...");
    let mut monitor = open_monitor(config)?;
    let interrupt = interrupt_channel()?;

    println!("Found {} power sensors", monitor.sensor_count()?);

    println!("Setting sampling frequency to {} Hz...", frequency);
    monitor
        .set_frequency(frequency)
        .wrap_err("Error setting sampling frequency")?;

    println!("Starting power monitoring...");
    monitor
        .start()
        .wrap_err("Error starting power monitoring")?;

    println!("Monitoring power for {} seconds...", duration);
    for i in 0..duration {
        match interrupt.recv_timeout(Duration::from_secs(1)) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                info!("Interrupted");
                break;
            }
        }

        match monitor.latest_snapshot() {
            Ok(snapshot) => println!("{}", format_snapshot(&snapshot)),
            Err(e) => {
                eprintln!("Error getting power data: {}", e);
                continue;
            }
        }

        if i > 0 && i % STATS_EVERY_SECS == 0 {
            match monitor.statistics() {
                Ok(stats) => println!("{}", format_statistics(&stats)),
                Err(e) => {
                    eprintln!("Error getting power statistics: {}", e);
                    continue;
                }
            }

            if i == duration / 2 {
                println!("Resetting statistics...");
                if let Err(e) = monitor.reset_statistics() {
                    eprintln!("Error resetting statistics: {}", e);
                }
            }
        }
    }

    println!("Stopping power monitoring...");
    if let Err(e) = monitor.stop() {
        eprintln!("Error stopping power monitoring: {}", e);
    }

    match monitor.statistics() {
        Ok(stats) => println!("{}", format_statistics(&stats)),
        Err(e) => eprintln!("Error getting power statistics: {}", e),
    }

    println!("Cleaning up...");
    monitor.teardown().wrap_err("Error cleaning up")?;
    Ok(())
}
