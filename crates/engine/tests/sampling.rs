use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pwmon_engine::{Catalog, PowerMonitor, Sensor, SimulatedSource};

fn monitor(hz: u32) -> PowerMonitor {
    let catalog = Catalog::from_sensors(vec![
        Sensor::placeholder("CPU"),
        Sensor::placeholder("GPU"),
        Sensor::placeholder("SOC"),
    ])
    .unwrap();
    PowerMonitor::with_catalog(catalog, Box::new(SimulatedSource::seeded(2024)), hz).unwrap()
}

#[test]
fn test_background_sampling_accumulates() {
    let monitor = monitor(50);
    monitor.start().unwrap();
    thread::sleep(Duration::from_millis(300));
    monitor.stop().unwrap();

    let stats = monitor.statistics().unwrap();
    let count = stats.total.power.count();
    assert!(count >= 2, "expected several ticks, got {}", count);
    for sensor in &stats.sensors {
        assert_eq!(sensor.power.count(), count);
        assert_eq!(sensor.voltage.count(), count);
    }

    // Stopped: nothing more gets folded
    thread::sleep(Duration::from_millis(100));
    assert_eq!(monitor.statistics().unwrap().total.power.count(), count);
}

#[test]
fn test_total_tracks_sensor_sum_while_sampling() {
    let monitor = monitor(50);
    monitor.start().unwrap();

    let deadline = Instant::now() + Duration::from_millis(500);
    let mut observed = 0;
    while Instant::now() < deadline {
        let snapshot = monitor.latest_snapshot().unwrap();
        if snapshot.timestamp.is_some() {
            let sum: f64 = snapshot.sensors.iter().map(|r| r.power).sum();
            assert!((snapshot.total.power - sum).abs() < 1e-9);
            observed += 1;
        }
        thread::sleep(Duration::from_millis(5));
    }
    monitor.stop().unwrap();
    assert!(observed > 0);
}

#[test]
fn test_concurrent_readers_see_consistent_statistics() {
    let monitor = Arc::new(monitor(100));
    let expected_sensors = monitor.sensor_count().unwrap();
    monitor.start().unwrap();

    let readers: Vec<_> = (0..10)
        .map(|_| {
            let monitor = Arc::clone(&monitor);
            thread::spawn(move || {
                let deadline = Instant::now() + Duration::from_secs(1);
                let mut last = 0;
                while Instant::now() < deadline {
                    let stats = monitor.statistics().unwrap();
                    let count = stats.total.power.count();
                    assert!(count >= last, "count went backwards: {} < {}", count, last);
                    assert_eq!(stats.sensors.len(), expected_sensors);
                    for sensor in &stats.sensors {
                        assert_eq!(sensor.power.count(), count);
                    }

                    let snapshot = monitor.latest_snapshot().unwrap();
                    assert_eq!(snapshot.sensor_count(), expected_sensors);
                    last = count;
                }
                last
            })
        })
        .collect();

    let finals: Vec<u64> = readers.into_iter().map(|r| r.join().unwrap()).collect();
    monitor.stop().unwrap();

    assert!(finals.iter().all(|c| *c > 0));
}

#[test]
fn test_frequency_change_while_sampling() {
    let monitor = monitor(1);
    monitor.start().unwrap();
    monitor.set_frequency(200).unwrap();
    assert_eq!(monitor.frequency(), Ok(200));
    // The first wait still runs at 1 Hz; after it the loop speeds up
    thread::sleep(Duration::from_millis(1400));
    monitor.stop().unwrap();

    let count = monitor.statistics().unwrap().total.power.count();
    assert!(count > 5, "expected faster sampling, got {} ticks", count);
}

#[test]
fn test_reset_while_sampling() {
    let monitor = monitor(100);
    monitor.start().unwrap();
    thread::sleep(Duration::from_millis(100));
    monitor.reset_statistics().unwrap();
    let right_after = monitor.statistics().unwrap().total.power.count();
    assert!(right_after <= 2);
    assert_eq!(
        monitor.statistics().unwrap().sensors.len(),
        monitor.sensor_count().unwrap()
    );
    monitor.stop().unwrap();
}

#[test]
fn test_drop_stops_sampling() {
    let monitor = monitor(100);
    monitor.start().unwrap();
    thread::sleep(Duration::from_millis(20));
    drop(monitor);
}
