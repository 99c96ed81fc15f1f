//! Power telemetry engine.
//!
//! Discovers the board's power sensors, samples them on a background thread
//! at a configurable frequency, and keeps both the latest snapshot and
//! running statistics (min/max/average/sum/count) for the current window.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use pwmon_engine::{MonitorConfig, PowerMonitor};
//!
//! let monitor = PowerMonitor::new(MonitorConfig::from_env())?;
//! monitor.set_frequency(10)?;
//! monitor.start()?;
//! std::thread::sleep(Duration::from_secs(1));
//!
//! let snapshot = monitor.latest_snapshot()?;
//! println!("Total: {:.2} W", snapshot.total.power);
//!
//! let stats = monitor.statistics()?;
//! println!("Average: {:?} W", stats.total.power.average());
//! monitor.stop()?;
//! # Ok::<(), pwmon_engine::Error>(())
//! ```

mod config;
mod error;
mod monitor;
mod reading;
mod scheduler;
mod stats;

pub use config::{MonitorConfig, SourceMode, DEFAULT_FREQUENCY_HZ, TESTING_ENV};
pub use error::{error_string, Error, Result};
pub use monitor::PowerMonitor;
pub use reading::{
    read_snapshot, Reading, Snapshot, NOMINAL_VOLTAGE, TOTAL_CRITICAL_THRESHOLD_W, TOTAL_NAME,
    TOTAL_WARNING_THRESHOLD_W,
};
pub use stats::{RunningStat, SensorStats, StatisticsSet};

pub use pwmon_platform::{
    Catalog, DiscoveryConfig, RawReading, SampleSource, Sensor, SensorKind, SimulatedSource,
    SysfsSource,
};
