//! Readings, snapshots and the per-tick sample reader.

use chrono::{DateTime, Utc};
use pwmon_platform::{Catalog, RawReading, SampleSource, Sensor, STATUS_NORMAL};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const TOTAL_NAME: &str = "Total";
/// Nominal system voltage reported on the synthesized total.
pub const NOMINAL_VOLTAGE: f64 = 5.0;
pub const TOTAL_WARNING_THRESHOLD_W: f64 = 25.0;
pub const TOTAL_CRITICAL_THRESHOLD_W: f64 = 35.0;

/// One sensor's values at one instant.
///
/// `power` is always `voltage * current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub name: String,
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
    pub online: bool,
    pub status: String,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
}

impl Reading {
    pub fn from_raw(name: impl Into<String>, raw: RawReading) -> Self {
        Self {
            name: name.into(),
            voltage: raw.voltage,
            current: raw.current,
            power: raw.voltage * raw.current,
            online: raw.online,
            status: raw.status,
            warning_threshold: raw.warning_threshold,
            critical_threshold: raw.critical_threshold,
        }
    }

    /// Placeholder reading for a sensor that has not been sampled yet.
    fn idle(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            voltage: 0.0,
            current: 0.0,
            power: 0.0,
            online: false,
            status: String::new(),
            warning_threshold: 0.0,
            critical_threshold: 0.0,
        }
    }

    /// Sums power and current across `sensors`.
    pub fn total<'a>(sensors: impl IntoIterator<Item = &'a Reading>) -> Self {
        let (power, current) = sensors
            .into_iter()
            .fold((0.0, 0.0), |(p, c), r| (p + r.power, c + r.current));

        Self {
            name: TOTAL_NAME.to_string(),
            voltage: NOMINAL_VOLTAGE,
            current,
            power,
            online: true,
            status: STATUS_NORMAL.to_string(),
            warning_threshold: TOTAL_WARNING_THRESHOLD_W,
            critical_threshold: TOTAL_CRITICAL_THRESHOLD_W,
        }
    }
}

/// The full reading set of one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the tick ran. `None` until the first tick completes.
    pub timestamp: Option<DateTime<Utc>>,
    pub total: Reading,
    /// Per-sensor readings in catalog order.
    pub sensors: Vec<Reading>,
}

impl Snapshot {
    /// An unsampled snapshot: named, zeroed, offline sensors.
    pub fn empty(catalog: &Catalog) -> Result<Self> {
        let mut sensors = Vec::new();
        sensors
            .try_reserve_exact(catalog.len())
            .map_err(|_| Error::Memory)?;
        sensors.extend(catalog.names().map(Reading::idle));

        let mut total = Reading::idle(TOTAL_NAME);
        total.online = true;

        Ok(Self {
            timestamp: None,
            total,
            sensors,
        })
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    pub fn sensor(&self, name: &str) -> Option<&Reading> {
        self.sensors.iter().find(|r| r.name == name)
    }
}

/// Produces one reading per cataloged sensor plus the total.
///
/// Fails with [`Error::Memory`] when the reading buffer cannot be allocated.
pub fn read_snapshot(catalog: &Catalog, source: &mut dyn SampleSource) -> Result<Snapshot> {
    let mut sensors = Vec::new();
    sensors
        .try_reserve_exact(catalog.len())
        .map_err(|_| Error::Memory)?;
    sensors.extend(
        catalog
            .iter()
            .map(|sensor: &Sensor| Reading::from_raw(sensor.name(), source.read(sensor))),
    );
    let total = Reading::total(&sensors);

    Ok(Snapshot {
        timestamp: Some(Utc::now()),
        total,
        sensors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwmon_platform::{ChannelLayout, SimulatedSource};

    fn catalog() -> Catalog {
        Catalog::from_sensors(vec![
            Sensor::bus_channel("VDD_IN", "/nonexistent", 1, ChannelLayout::Hwmon),
            Sensor::bus_channel("VDD_SOC", "/nonexistent", 2, ChannelLayout::Hwmon),
            Sensor::placeholder("CPU"),
        ])
        .unwrap()
    }

    struct Fixed;

    impl SampleSource for Fixed {
        fn read(&mut self, sensor: &Sensor) -> RawReading {
            match sensor.name() {
                "VDD_IN" => RawReading::online(5.0, 2.0),
                "VDD_SOC" => RawReading::online(1.0, 0.5),
                _ => RawReading::offline("Read error"),
            }
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_power_is_product() {
        let reading = Reading::from_raw("x", RawReading::online(3.3, 0.5));
        assert!((reading.power - 1.65).abs() < 1e-12);
    }

    #[test]
    fn test_read_snapshot_totals() {
        let snapshot = read_snapshot(&catalog(), &mut Fixed).unwrap();

        assert!(snapshot.timestamp.is_some());
        assert_eq!(snapshot.sensor_count(), 3);
        assert_eq!(snapshot.sensors[0].power, 10.0);
        assert_eq!(snapshot.sensors[1].power, 0.5);
        assert!(!snapshot.sensors[2].online);

        assert_eq!(snapshot.total.name, "Total");
        assert_eq!(snapshot.total.power, 10.5);
        assert_eq!(snapshot.total.current, 2.5);
        assert_eq!(snapshot.total.voltage, NOMINAL_VOLTAGE);
        assert!(snapshot.total.online);
        assert_eq!(snapshot.total.warning_threshold, 25.0);
        assert_eq!(snapshot.total.critical_threshold, 35.0);
    }

    #[test]
    fn test_total_matches_sum_over_many_ticks() {
        let catalog = catalog();
        let mut source = SimulatedSource::seeded(1);

        for _ in 0..1000 {
            let snapshot = read_snapshot(&catalog, &mut source).unwrap();
            let power: f64 = snapshot.sensors.iter().map(|r| r.power).sum();
            let current: f64 = snapshot.sensors.iter().map(|r| r.current).sum();
            assert!((snapshot.total.power - power).abs() < 1e-9);
            assert!((snapshot.total.current - current).abs() < 1e-9);
            assert!(snapshot.total.online);
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = Snapshot::empty(&catalog()).unwrap();
        assert!(snapshot.timestamp.is_none());
        assert_eq!(snapshot.sensor_count(), 3);
        assert!(snapshot.sensors.iter().all(|r| !r.online && r.power == 0.0));
        assert_eq!(snapshot.sensor("VDD_SOC").map(|r| r.voltage), Some(0.0));
        assert!(snapshot.total.online);
    }
}
