use std::fs;
use std::path::Path;

use tracing::trace;

use crate::sensor::{ChannelLayout, Sensor, SensorSource};
use crate::source::{RawReading, SampleSource};

const MILLI: f64 = 1_000.0;
const MICRO: f64 = 1_000_000.0;
const STATUS_READ_ERROR: &str = "Read error";
const STATUS_NO_SOURCE: &str = "No data source";

/// Reads live values from sysfs.
///
/// Bus channels report millivolts and milliamperes, power supplies report
/// microvolts and microamperes.
#[derive(Debug, Default)]
pub struct SysfsSource;

impl SysfsSource {
    pub fn new() -> Self {
        Self
    }
}

impl SampleSource for SysfsSource {
    fn read(&mut self, sensor: &Sensor) -> RawReading {
        let reading = match sensor.source() {
            SensorSource::BusChannel {
                dir,
                channel,
                layout,
            } => read_bus_channel(dir, *channel, *layout),
            SensorSource::Supply { dir } => read_supply(dir),
            SensorSource::Placeholder => RawReading::offline(STATUS_NO_SOURCE),
        };
        trace!(sensor = sensor.name(), voltage = reading.voltage, current = reading.current, "Read sensor");
        reading
    }

    fn name(&self) -> &'static str {
        "sysfs"
    }
}

fn read_number(path: &Path) -> Option<f64> {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| content.trim().parse::<i64>().ok())
        .map(|value| value as f64)
}

fn read_bus_channel(dir: &Path, channel: u32, layout: ChannelLayout) -> RawReading {
    let millivolts = read_number(&dir.join(layout.voltage_file(channel)));
    let milliamps = read_number(&dir.join(layout.current_file(channel)));

    let (Some(millivolts), Some(milliamps)) = (millivolts, milliamps) else {
        return RawReading::offline(STATUS_READ_ERROR);
    };

    let voltage = millivolts / MILLI;
    let current = milliamps / MILLI;
    let mut reading = RawReading::online(voltage, current);

    // Limits are current limits; express them in watts at the present voltage
    if let Some((warn_file, crit_file)) = layout.limit_files(channel) {
        let warn = read_number(&dir.join(warn_file));
        let crit = read_number(&dir.join(crit_file));
        if let (Some(warn), Some(crit)) = (warn, crit) {
            if voltage > 0.0 {
                reading = reading.with_thresholds(warn / MILLI * voltage, crit / MILLI * voltage);
            }
        }
    }

    reading
}

fn read_supply(dir: &Path) -> RawReading {
    let microvolts = read_number(&dir.join("voltage_now"));
    let microamps = read_number(&dir.join("current_now"));

    let (Some(microvolts), Some(microamps)) = (microvolts, microamps) else {
        return RawReading::offline(STATUS_READ_ERROR);
    };

    // Batteries report a signed current while discharging
    let mut reading = RawReading::online(microvolts / MICRO, microamps.abs() / MICRO);

    if let Ok(online) = fs::read_to_string(dir.join("online")) {
        reading.online = online.trim() == "1";
    }
    if let Ok(status) = fs::read_to_string(dir.join("status")) {
        let status = status.trim();
        if !status.is_empty() {
            reading.status = status.to_string();
        }
    }

    reading
}
