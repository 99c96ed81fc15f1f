//! Running statistics over the current sampling window.

use chrono::{DateTime, Utc};
use pwmon_platform::Catalog;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::reading::{Reading, Snapshot, TOTAL_NAME};

/// Online summary of one metric.
///
/// Min, max and average are undefined until the first value is folded in.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RunningStat {
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    count: u64,
    average: Option<f64>,
}

impl RunningStat {
    pub fn fold(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.sum += value;
        self.count += 1;
        self.average = Some(self.sum / self.count as f64);
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn average(&self) -> Option<f64> {
        self.average
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Voltage, current and power summaries for one named sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorStats {
    pub name: String,
    pub voltage: RunningStat,
    pub current: RunningStat,
    pub power: RunningStat,
}

impl SensorStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            voltage: RunningStat::default(),
            current: RunningStat::default(),
            power: RunningStat::default(),
        }
    }

    pub fn fold(&mut self, reading: &Reading) {
        self.voltage.fold(reading.voltage);
        self.current.fold(reading.current);
        self.power.fold(reading.power);
    }

    fn clear(&mut self) {
        self.voltage = RunningStat::default();
        self.current = RunningStat::default();
        self.power = RunningStat::default();
    }
}

/// Statistics for the total and every sensor, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSet {
    /// Start of the current window: creation or the last reset.
    pub window_start: DateTime<Utc>,
    pub total: SensorStats,
    pub sensors: Vec<SensorStats>,
}

impl StatisticsSet {
    pub fn new(catalog: &Catalog) -> Result<Self> {
        let mut sensors = Vec::new();
        sensors
            .try_reserve_exact(catalog.len())
            .map_err(|_| Error::Memory)?;
        sensors.extend(catalog.names().map(SensorStats::new));

        Ok(Self {
            window_start: Utc::now(),
            total: SensorStats::new(TOTAL_NAME),
            sensors,
        })
    }

    /// Folds one tick into every summary.
    ///
    /// Readings are matched to sensors by position; the snapshot must come
    /// from the same catalog.
    pub fn fold(&mut self, snapshot: &Snapshot) {
        debug_assert_eq!(self.sensors.len(), snapshot.sensors.len());
        for (stats, reading) in self.sensors.iter_mut().zip(&snapshot.sensors) {
            stats.fold(reading);
        }
        self.total.fold(&snapshot.total);
    }

    /// Clears every summary and restarts the window. Sensor names are
    /// re-stamped from the catalog.
    pub fn reset(&mut self, catalog: &Catalog) {
        self.total.clear();
        self.total.name = TOTAL_NAME.to_string();
        for (stats, name) in self.sensors.iter_mut().zip(catalog.names()) {
            stats.clear();
            stats.name = name.to_string();
        }
        self.window_start = Utc::now();
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    pub fn sensor(&self, name: &str) -> Option<&SensorStats> {
        self.sensors.iter().find(|s| s.name == name)
    }
}
