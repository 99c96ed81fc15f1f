//! Sensor discovery and sample backends for pwmon.
//!
//! This crate knows where power sensors live on an embedded Linux board and
//! how to read them. It provides:
//!
//! - [`Catalog`] - the ordered list of sensors found at startup
//! - [`SampleSource`] - the per-tick backend contract
//! - [`SysfsSource`] - live values from sysfs
//! - [`SimulatedSource`] - synthetic values for development and tests
//!
//! # Example
//!
//! ```no_run
//! use pwmon_platform::{Catalog, DiscoveryConfig, SampleSource, SysfsSource};
//!
//! let catalog = Catalog::discover(&DiscoveryConfig::default())?;
//! let mut source = SysfsSource::new();
//! for sensor in &catalog {
//!     let raw = source.read(sensor);
//!     println!("{}: {:.2} V {:.2} A", sensor.name(), raw.voltage, raw.current);
//! }
//! # Ok::<(), pwmon_platform::DiscoveryError>(())
//! ```

mod catalog;
mod sensor;
mod simulated;
mod source;
mod sysfs;

pub use catalog::{
    Catalog, DiscoveryConfig, DiscoveryError, BUS_DEVICES_PATH, POWER_SUPPLY_PATH,
    TESTING_BUS_DEVICES_PATH, TESTING_POWER_SUPPLY_PATH,
};
pub use sensor::{ChannelLayout, Sensor, SensorKind, SensorSource};
pub use simulated::SimulatedSource;
pub use source::{
    RawReading, SampleSource, DEFAULT_CRITICAL_THRESHOLD_W, DEFAULT_WARNING_THRESHOLD_W,
    STATUS_NORMAL,
};
pub use sysfs::SysfsSource;
