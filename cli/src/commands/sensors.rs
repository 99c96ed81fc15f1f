use color_eyre::eyre::Result;
use pwmon_engine::{MonitorConfig, Sensor};

use crate::commands::open_monitor;

pub fn run(config: MonitorConfig) -> Result<()> {
    let source = config.resolved_source();
    let monitor = open_monitor(config)?;
    let sensors = monitor.sensors()?;

    println!("Found {} power sensors (source: {})", sensors.len(), source.label());
    println!("{}", "=".repeat(60));
    for (index, sensor) in sensors.iter().enumerate() {
        println!("{:>2}  {}", index, sensor_row(sensor));
    }

    Ok(())
}

fn sensor_row(sensor: &Sensor) -> String {
    let path = sensor
        .path()
        .map_or_else(|| "-".to_string(), |p| p.display().to_string());
    format!(
        "{:<24} {:<7} ({}) {}",
        sensor.name(),
        sensor.kind().label(),
        sensor.kind().id(),
        path
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_sensor_row_shows_kind_id() {
        let supply = Sensor::supply("BAT0", Path::new("/sys/class/power_supply/BAT0"));
        let row = sensor_row(&supply);
        assert!(row.starts_with("BAT0"));
        assert!(row.contains("System  (2) /sys/class/power_supply/BAT0"));

        let placeholder = sensor_row(&Sensor::placeholder("CPU"));
        assert!(placeholder.ends_with("(2) -"));
    }
}
