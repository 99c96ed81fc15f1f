//! Sensor discovery.
//!
//! The catalog is built once from two independent sysfs scans whose results
//! are concatenated in discovery order:
//!
//! 1. bus monitors: `ina3221` chips under the bus-device root, each exposing
//!    labelled voltage/current channels (hwmon or iio layout)
//! 2. system supplies: power-supply class entries with `voltage_now` and
//!    `current_now`
//!
//! A scan root that cannot be opened contributes no sensors. Only an empty
//! combined result is an error, unless placeholder sensors are allowed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::sensor::{ChannelLayout, Sensor};

pub const BUS_DEVICES_PATH: &str = "/sys/bus/i2c/devices";
pub const POWER_SUPPLY_PATH: &str = "/sys/class/power_supply";
pub const TESTING_BUS_DEVICES_PATH: &str = "/fake_sys/bus/i2c/devices";
pub const TESTING_POWER_SUPPLY_PATH: &str = "/fake_sys/class/power_supply";

const MONITOR_CHIP: &str = "ina3221";
const NOT_CONNECTED: &str = "NC";
const SUM_OF_SHUNTS_CHANNEL: u32 = 7;
const SUPPLY_PREFIX: &str = "ucsi-source-psy-";
const PLACEHOLDER_NAMES: [&str; 2] = ["CPU", "GPU"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DiscoveryError {
    #[error("No sensors found")]
    NoSensors,

    #[error("File access error")]
    FileAccess,

    #[error("Memory allocation error")]
    Memory,
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Where to look for sensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub bus_root: PathBuf,
    pub supply_root: PathBuf,
    /// Register the `CPU`/`GPU` placeholders instead of failing when nothing
    /// is found.
    pub allow_placeholders: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            bus_root: PathBuf::from(BUS_DEVICES_PATH),
            supply_root: PathBuf::from(POWER_SUPPLY_PATH),
            allow_placeholders: false,
        }
    }
}

impl DiscoveryConfig {
    /// Roots redirected to the fake sysfs tree, with placeholders enabled.
    pub fn testing() -> Self {
        Self {
            bus_root: PathBuf::from(TESTING_BUS_DEVICES_PATH),
            supply_root: PathBuf::from(TESTING_POWER_SUPPLY_PATH),
            allow_placeholders: true,
        }
    }
}

/// Ordered, immutable list of discovered sensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    sensors: Vec<Sensor>,
}

impl Catalog {
    /// Scans both roots and builds the catalog.
    pub fn discover(config: &DiscoveryConfig) -> Result<Self> {
        let mut sensors = Vec::new();

        find_bus_monitors(&config.bus_root, &mut sensors)?;
        find_system_supplies(&config.supply_root, &mut sensors)?;

        if sensors.is_empty() {
            if !config.allow_placeholders {
                return Err(DiscoveryError::NoSensors);
            }
            warn!("No power sensors found, registering placeholder sensors");
            for name in PLACEHOLDER_NAMES {
                push_sensor(&mut sensors, Sensor::placeholder(name))?;
            }
        }

        info!(count = sensors.len(), "Sensor discovery complete");
        Ok(Self { sensors })
    }

    /// Builds a catalog from an explicit sensor list.
    pub fn from_sensors(sensors: Vec<Sensor>) -> Result<Self> {
        if sensors.is_empty() {
            return Err(DiscoveryError::NoSensors);
        }
        Ok(Self { sensors })
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sensors.iter().map(Sensor::name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sensor> {
        self.sensors.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Sensor;
    type IntoIter = std::slice::Iter<'a, Sensor>;

    fn into_iter(self) -> Self::IntoIter {
        self.sensors.iter()
    }
}

fn push_sensor(sensors: &mut Vec<Sensor>, sensor: Sensor) -> Result<()> {
    sensors
        .try_reserve(1)
        .map_err(|_| DiscoveryError::Memory)?;
    sensors.push(sensor);
    Ok(())
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .ok()
}

/// Visible entries of `dir`, sorted by name.
fn sorted_entries(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut entries: Vec<(String, PathBuf)> = fs::read_dir(dir)?
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            (!is_hidden(&name)).then(|| (name, entry.path()))
        })
        .collect();
    entries.sort();
    Ok(entries)
}

fn find_bus_monitors(root: &Path, sensors: &mut Vec<Sensor>) -> Result<()> {
    let devices = match sorted_entries(root) {
        Ok(devices) => devices,
        Err(e) => {
            warn!(path = %root.display(), error = %e, "Bus device folder not accessible");
            return Ok(());
        }
    };

    for (name, path) in devices {
        if !path.is_dir() {
            continue;
        }

        let Some(chip) = read_trimmed(&path.join("name")) else {
            continue;
        };
        if !chip.contains(MONITOR_CHIP) {
            continue;
        }

        debug!(device = %name, chip = %chip, "Found power monitor chip");
        match find_metric_dirs(&path, sensors) {
            Ok(()) => {}
            Err(DiscoveryError::Memory) => return Err(DiscoveryError::Memory),
            Err(e) => debug!(path = %path.display(), error = %e, "Skipping power monitor"),
        }
    }

    Ok(())
}

fn find_metric_dirs(device: &Path, sensors: &mut Vec<Sensor>) -> Result<()> {
    let entries = sorted_entries(device).map_err(|_| DiscoveryError::FileAccess)?;

    for (name, path) in entries {
        if !path.is_dir() {
            continue;
        }

        // hwmon/ holds one or more hwmonN folders, iio:deviceN is the folder itself
        let metric_dirs = if name.contains("hwmon") {
            match sorted_entries(&path) {
                Ok(children) => children.into_iter().map(|(_, dir)| dir).collect(),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Unreadable hwmon folder");
                    continue;
                }
            }
        } else if name.contains("iio:device") {
            vec![path]
        } else {
            continue;
        };

        for metric_dir in metric_dirs {
            match find_channels(&metric_dir, sensors) {
                Ok(()) => {}
                Err(DiscoveryError::Memory) => return Err(DiscoveryError::Memory),
                Err(e) => debug!(path = %metric_dir.display(), error = %e, "Skipping metric folder"),
            }
        }
    }

    Ok(())
}

fn find_channels(dir: &Path, sensors: &mut Vec<Sensor>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|_| DiscoveryError::FileAccess)?;

    // read_dir order is arbitrary; keep channels of one chip in index order
    let mut labels: Vec<(u32, ChannelLayout, PathBuf)> = entries
        .flatten()
        .filter_map(|entry| {
            let file_name = entry.file_name();
            let name = file_name.to_str()?;
            let (layout, channel) = ChannelLayout::parse_label(name)?;
            Some((channel, layout, entry.path()))
        })
        .collect();
    labels.sort_by_key(|(channel, _, _)| *channel);

    for (channel, layout, label_path) in labels {
        let Some(label) = read_trimmed(&label_path) else {
            debug!(path = %label_path.display(), "Unreadable channel label");
            continue;
        };

        if label.contains(NOT_CONNECTED) || channel == SUM_OF_SHUNTS_CHANNEL {
            continue;
        }

        let has_voltage = dir.join(layout.voltage_file(channel)).exists();
        let has_current = dir.join(layout.current_file(channel)).exists();
        if !(has_voltage && has_current) {
            debug!(label = %label, channel, "Channel missing voltage or current input");
            continue;
        }

        info!(name = %label, channel, "Found bus power sensor");
        push_sensor(sensors, Sensor::bus_channel(label, dir, channel, layout))?;
    }

    Ok(())
}

fn find_system_supplies(root: &Path, sensors: &mut Vec<Sensor>) -> Result<()> {
    let supplies = match sorted_entries(root) {
        Ok(supplies) => supplies,
        Err(e) => {
            warn!(path = %root.display(), error = %e, "Power supply folder not accessible");
            return Ok(());
        }
    };

    for (dir_name, path) in supplies {
        if !path.is_dir() {
            continue;
        }

        let name = dir_name
            .strip_prefix(SUPPLY_PREFIX)
            .unwrap_or(&dir_name)
            .to_string();
        let supply_type = read_trimmed(&path.join("type")).unwrap_or_else(|| "SYSTEM".into());
        let model = read_trimmed(&path.join("model_name")).unwrap_or_else(|| "<EMPTY>".into());

        let has_voltage = path.join("voltage_now").exists();
        let has_current = path.join("current_now").exists();
        if !(has_voltage && has_current) {
            debug!(name = %name, "Skipped supply: missing voltage or current capability");
            continue;
        }

        info!(name = %name, supply_type = %supply_type, model = %model, "Found supply power sensor");
        push_sensor(sensors, Sensor::supply(name, path))?;
    }

    Ok(())
}
