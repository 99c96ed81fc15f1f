//! Sensor identity and classification.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How a sensor is exposed by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// A channel of a multi-channel current/voltage monitor on a peripheral bus.
    BusMonitor,
    /// An entry of the generic power-supply class (battery, USB-PD input, ...).
    SystemSupply,
}

impl SensorKind {
    /// Returns a short label for the sensor kind.
    pub fn label(&self) -> &'static str {
        match self {
            SensorKind::BusMonitor => "I2C",
            SensorKind::SystemSupply => "System",
        }
    }

    /// Stable numeric identifier, shared with external tooling.
    pub fn id(&self) -> u32 {
        match self {
            SensorKind::BusMonitor => 1,
            SensorKind::SystemSupply => 2,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// File layout of a bus-monitor metric directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// `inN_label`, `inN_input`, `currN_input`
    Hwmon,
    /// `rail_name_N`, `in_voltageN_input`, `in_currentN_input`
    Iio,
}

impl ChannelLayout {
    pub fn voltage_file(&self, channel: u32) -> String {
        match self {
            ChannelLayout::Hwmon => format!("in{}_input", channel),
            ChannelLayout::Iio => format!("in_voltage{}_input", channel),
        }
    }

    pub fn current_file(&self, channel: u32) -> String {
        match self {
            ChannelLayout::Hwmon => format!("curr{}_input", channel),
            ChannelLayout::Iio => format!("in_current{}_input", channel),
        }
    }

    /// Files holding the warning and critical current limits, when the
    /// layout exposes them.
    pub fn limit_files(&self, channel: u32) -> Option<(String, String)> {
        match self {
            ChannelLayout::Hwmon => Some((
                format!("curr{}_max", channel),
                format!("curr{}_crit", channel),
            )),
            ChannelLayout::Iio => None,
        }
    }

    /// Parses the channel index out of a label file name.
    ///
    /// Returns `None` when the file is not a label file for this layout.
    pub fn parse_label(file_name: &str) -> Option<(ChannelLayout, u32)> {
        if let Some(rest) = file_name.strip_prefix("in") {
            if let Some(index) = rest.strip_suffix("_label") {
                return index.parse().ok().map(|n| (ChannelLayout::Hwmon, n));
            }
        }
        if let Some(index) = file_name.strip_prefix("rail_name_") {
            return index.parse().ok().map(|n| (ChannelLayout::Iio, n));
        }
        None
    }
}

/// Where a sensor's values come from. Only sample backends look inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorSource {
    BusChannel {
        dir: PathBuf,
        channel: u32,
        layout: ChannelLayout,
    },
    Supply {
        dir: PathBuf,
    },
    /// Stand-in used when no real hardware was found in testing mode.
    Placeholder,
}

/// A discovered power sensor. Immutable once discovery completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sensor {
    name: String,
    kind: SensorKind,
    source: SensorSource,
}

impl Sensor {
    pub fn bus_channel(
        name: impl Into<String>,
        dir: impl Into<PathBuf>,
        channel: u32,
        layout: ChannelLayout,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SensorKind::BusMonitor,
            source: SensorSource::BusChannel {
                dir: dir.into(),
                channel,
                layout,
            },
        }
    }

    pub fn supply(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: SensorKind::SystemSupply,
            source: SensorSource::Supply { dir: dir.into() },
        }
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SensorKind::SystemSupply,
            source: SensorSource::Placeholder,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    pub fn source(&self) -> &SensorSource {
        &self.source
    }

    /// Directory backing this sensor, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            SensorSource::BusChannel { dir, .. } | SensorSource::Supply { dir } => Some(dir),
            SensorSource::Placeholder => None,
        }
    }
}
