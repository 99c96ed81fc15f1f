use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;

use color_eyre::eyre::{Result, WrapErr};
use pwmon_engine::{MonitorConfig, Snapshot, StatisticsSet};
use serde_json::json;

use crate::commands::{interrupt_channel, open_monitor};

pub fn document(snapshot: &Snapshot, stats: &StatisticsSet) -> serde_json::Value {
    json!({
        "timestamp": snapshot.timestamp.map(|t| t.to_rfc3339()),
        "total": snapshot.total,
        "sensors": snapshot.sensors,
        "statistics": stats,
    })
}

pub fn run(config: MonitorConfig, samples: u32, interval: u64, compact: bool) -> Result<()> {
    let monitor = open_monitor(config)?;
    let interrupt = interrupt_channel()?;
    monitor.start().wrap_err("Error starting power monitoring")?;

    let mut counter = 0u32;
    loop {
        match interrupt.recv_timeout(Duration::from_millis(interval)) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }

        let (snapshot, stats) = match (monitor.latest_snapshot(), monitor.statistics()) {
            (Ok(snapshot), Ok(stats)) => (snapshot, stats),
            (Err(e), _) | (_, Err(e)) => {
                eprintln!("Error getting power data: {}", e);
                continue;
            }
        };

        let doc = document(&snapshot, &stats);
        if compact {
            println!("{}", serde_json::to_string(&doc)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }

        counter += 1;
        if samples > 0 && counter >= samples {
            break;
        }
    }

    monitor.stop().wrap_err("Error stopping power monitoring")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwmon_engine::{Catalog, PowerMonitor, Sensor, SimulatedSource};

    #[test]
    fn test_document_shape() {
        let catalog =
            Catalog::from_sensors(vec![Sensor::placeholder("CPU"), Sensor::placeholder("GPU")])
                .unwrap();
        let monitor =
            PowerMonitor::with_catalog(catalog, Box::new(SimulatedSource::seeded(8)), 1).unwrap();
        let snapshot = monitor.sample_now().unwrap();
        let doc = document(&snapshot, &monitor.statistics().unwrap());

        assert!(doc["timestamp"].is_string());
        assert_eq!(doc["total"]["name"], "Total");
        assert_eq!(doc["total"]["online"], true);
        assert_eq!(doc["sensors"].as_array().map(Vec::len), Some(2));
        assert_eq!(doc["sensors"][1]["name"], "GPU");
        assert_eq!(doc["statistics"]["total"]["power"]["count"], 1);
        assert!(doc["statistics"]["sensors"][0]["voltage"]["min"].is_number());
    }
}
