pub mod config;
pub mod monitor;
pub mod pipe;
pub mod sensors;

use std::sync::mpsc;

use color_eyre::eyre::{Result, WrapErr};
use pwmon_engine::{MonitorConfig, PowerMonitor};

/// Initializes the engine, reporting failures with the engine's message.
pub fn open_monitor(config: MonitorConfig) -> Result<PowerMonitor> {
    PowerMonitor::new(config).wrap_err("Error initializing power monitor")
}

/// Receiver that yields once when the user presses Ctrl-C.
pub fn interrupt_channel() -> Result<mpsc::Receiver<()>> {
    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .wrap_err("Failed to install Ctrl-C handler")?;
    Ok(rx)
}
