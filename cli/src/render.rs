use std::fmt::Write;
use std::time::Duration;

use chrono::Utc;
use pwmon_engine::{Snapshot, StatisticsSet};

/// Format seconds as human-readable duration (e.g., "2m 5s").
pub fn format_duration(secs: u64) -> String {
    humantime::format_duration(Duration::from_secs(secs)).to_string()
}

fn watts(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2} W", v))
}

pub fn format_snapshot(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let total = &snapshot.total;

    let _ = writeln!(out, "===== Power Data =====");
    let _ = writeln!(
        out,
        "Total Power: {:.2} W ({:.2} V, {:.2} A)",
        total.power, total.voltage, total.current
    );
    let _ = writeln!(out, "\nSensor Details:");
    for sensor in &snapshot.sensors {
        let _ = writeln!(
            out,
            "  {}: {:.2} W ({:.2} V, {:.2} A) - {}",
            sensor.name,
            sensor.power,
            sensor.voltage,
            sensor.current,
            if sensor.online { "Online" } else { "Offline" }
        );
    }
    out
}

pub fn format_statistics(stats: &StatisticsSet) -> String {
    let mut out = String::new();
    let total = &stats.total.power;
    let window = (Utc::now() - stats.window_start).num_seconds().max(0) as u64;

    let _ = writeln!(out, "===== Power Statistics =====");
    let _ = writeln!(
        out,
        "Window: {} ({} samples)",
        format_duration(window),
        total.count()
    );
    let _ = writeln!(
        out,
        "Total Power: Avg={}, Min={}, Max={}",
        watts(total.average()),
        watts(total.min()),
        watts(total.max())
    );
    let _ = writeln!(out, "\nSensor Statistics:");
    for sensor in &stats.sensors {
        let _ = writeln!(
            out,
            "  {}: Avg={}, Min={}, Max={}",
            sensor.name,
            watts(sensor.power.average()),
            watts(sensor.power.min()),
            watts(sensor.power.max())
        );
    }
    out
}
