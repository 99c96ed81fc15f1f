//! Sample backend contract.

use crate::sensor::Sensor;

pub const DEFAULT_WARNING_THRESHOLD_W: f64 = 10.0;
pub const DEFAULT_CRITICAL_THRESHOLD_W: f64 = 15.0;
pub const STATUS_NORMAL: &str = "Normal";

/// Values a backend reports for one sensor at one instant.
///
/// Voltage is in volts and current in amperes. Power is never part of a raw
/// reading; it is always derived from these two.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub voltage: f64,
    pub current: f64,
    pub online: bool,
    pub status: String,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
}

impl RawReading {
    pub fn online(voltage: f64, current: f64) -> Self {
        Self {
            voltage,
            current,
            online: true,
            status: STATUS_NORMAL.to_string(),
            warning_threshold: DEFAULT_WARNING_THRESHOLD_W,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD_W,
        }
    }

    /// A zeroed reading for a sensor that could not be read.
    pub fn offline(status: impl Into<String>) -> Self {
        Self {
            voltage: 0.0,
            current: 0.0,
            online: false,
            status: status.into(),
            warning_threshold: DEFAULT_WARNING_THRESHOLD_W,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD_W,
        }
    }

    pub fn with_thresholds(mut self, warning: f64, critical: f64) -> Self {
        self.warning_threshold = warning;
        self.critical_threshold = critical;
        self
    }
}

/// A pluggable data source, called once per sensor per sampling tick.
///
/// Implementations must return within a bounded time and report I/O
/// failures as an offline [`RawReading`] rather than panicking.
pub trait SampleSource: Send {
    /// Reads the current values of one sensor.
    fn read(&mut self, sensor: &Sensor) -> RawReading;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read(&mut self, sensor: &Sensor) -> RawReading {
        (**self).read(sensor)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
