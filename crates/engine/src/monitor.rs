//! The engine handle.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use pwmon_platform::{Catalog, SampleSource, Sensor};
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::{Error, Result};
use crate::reading::Snapshot;
use crate::scheduler::{lock, Pipeline, Sampler, Shared};
use crate::stats::StatisticsSet;

struct Inner {
    pipeline: Pipeline,
    sampler: Mutex<Option<Sampler>>,
}

/// Owns the sensor catalog, the live snapshot, the running statistics and
/// the sampling thread.
///
/// All queries take `&self` and can be issued from any number of threads.
/// After [`teardown`](Self::teardown) every operation fails with
/// [`Error::NotInitialized`]. Dropping a live monitor tears it down.
pub struct PowerMonitor {
    inner: Option<Inner>,
}

impl PowerMonitor {
    /// Discovers sensors and prepares an idle monitor.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        let source = config.build_source();
        Self::with_source(config, source)
    }

    /// Discovers sensors and samples them through a caller-provided backend.
    pub fn with_source(config: MonitorConfig, source: Box<dyn SampleSource>) -> Result<Self> {
        if config.frequency_hz == 0 {
            warn!("Refusing to initialize with a sampling frequency of 0 Hz");
            return Err(Error::InitFailed);
        }

        let catalog = Catalog::discover(&config.discovery())?;
        Self::with_catalog(catalog, source, config.frequency_hz)
    }

    /// Builds a monitor over an already discovered catalog.
    pub fn with_catalog(
        catalog: Catalog,
        source: Box<dyn SampleSource>,
        frequency_hz: u32,
    ) -> Result<Self> {
        if frequency_hz == 0 {
            return Err(Error::InitFailed);
        }
        if catalog.is_empty() {
            return Err(Error::NoSensors);
        }

        let shared = Shared {
            snapshot: Snapshot::empty(&catalog)?,
            stats: StatisticsSet::new(&catalog)?,
        };

        info!(
            sensors = catalog.len(),
            source = source.name(),
            frequency_hz,
            "Power monitor initialized"
        );

        let pipeline = Pipeline {
            catalog: Arc::new(catalog),
            source: Arc::new(Mutex::new(source)),
            shared: Arc::new(Mutex::new(shared)),
            frequency_hz: Arc::new(AtomicU32::new(frequency_hz)),
        };

        Ok(Self {
            inner: Some(Inner {
                pipeline,
                sampler: Mutex::new(None),
            }),
        })
    }

    fn inner(&self) -> Result<&Inner> {
        self.inner.as_ref().ok_or(Error::NotInitialized)
    }

    /// Stops sampling if active and releases all state.
    pub fn teardown(&mut self) -> Result<()> {
        let inner = self.inner.take().ok_or(Error::NotInitialized)?;
        let sampler = inner
            .sampler
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(sampler) = sampler {
            sampler.stop();
        }
        info!("Power monitor torn down");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    pub fn set_frequency(&self, hz: i32) -> Result<()> {
        let inner = self.inner()?;
        let hz = u32::try_from(hz)
            .ok()
            .filter(|hz| *hz > 0)
            .ok_or(Error::InvalidFrequency)?;
        inner.pipeline.frequency_hz.store(hz, Ordering::Relaxed);
        debug!(frequency_hz = hz, "Sampling frequency updated");
        Ok(())
    }

    pub fn frequency(&self) -> Result<u32> {
        Ok(self.inner()?.pipeline.frequency_hz.load(Ordering::Relaxed))
    }

    /// Starts the background sampling thread. Returns once it is running.
    pub fn start(&self) -> Result<()> {
        let inner = self.inner()?;
        let mut sampler = lock(&inner.sampler);
        if sampler.is_some() {
            return Err(Error::AlreadyRunning);
        }
        *sampler = Some(Sampler::spawn(inner.pipeline.clone())?);
        Ok(())
    }

    /// Stops the sampling thread. Returns once it has exited; this may take
    /// as long as one sensor read.
    pub fn stop(&self) -> Result<()> {
        let inner = self.inner()?;
        let mut sampler = lock(&inner.sampler);
        let running = sampler.take().ok_or(Error::NotRunning)?;
        running.stop();
        Ok(())
    }

    pub fn is_sampling(&self) -> Result<bool> {
        Ok(lock(&self.inner()?.sampler).is_some())
    }

    /// Runs one tick on the calling thread. Only allowed while stopped.
    pub fn sample_now(&self) -> Result<Snapshot> {
        let inner = self.inner()?;
        let sampler = lock(&inner.sampler);
        if sampler.is_some() {
            return Err(Error::AlreadyRunning);
        }
        inner.pipeline.tick()?;
        let snapshot = lock(&inner.pipeline.shared).snapshot.clone();
        drop(sampler);
        Ok(snapshot)
    }

    /// Copy of the most recent tick.
    pub fn latest_snapshot(&self) -> Result<Snapshot> {
        let inner = self.inner()?;
        let shared = lock(&inner.pipeline.shared);
        Ok(shared.snapshot.clone())
    }

    /// Copy of the statistics for the current window.
    pub fn statistics(&self) -> Result<StatisticsSet> {
        let inner = self.inner()?;
        let shared = lock(&inner.pipeline.shared);
        Ok(shared.stats.clone())
    }

    pub fn reset_statistics(&self) -> Result<()> {
        let inner = self.inner()?;
        let mut shared = lock(&inner.pipeline.shared);
        shared.stats.reset(&inner.pipeline.catalog);
        debug!("Statistics reset");
        Ok(())
    }

    pub fn sensor_count(&self) -> Result<usize> {
        Ok(self.inner()?.pipeline.catalog.len())
    }

    /// Sensor names in catalog order.
    pub fn sensor_names(&self) -> Result<Vec<String>> {
        let catalog = &self.inner()?.pipeline.catalog;
        Ok(catalog.names().map(str::to_string).collect())
    }

    pub fn sensors(&self) -> Result<Vec<Sensor>> {
        Ok(self.inner()?.pipeline.catalog.sensors().to_vec())
    }
}

impl Drop for PowerMonitor {
    fn drop(&mut self) {
        if self.inner.is_some() {
            let _ = self.teardown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwmon_platform::SimulatedSource;
    use std::thread;
    use std::time::Duration;

    fn monitor() -> PowerMonitor {
        let catalog =
            Catalog::from_sensors(vec![Sensor::placeholder("CPU"), Sensor::placeholder("GPU")])
                .unwrap();
        PowerMonitor::with_catalog(catalog, Box::new(SimulatedSource::seeded(11)), 1).unwrap()
    }

    #[test]
    fn test_frequency_validation() {
        let monitor = monitor();
        assert_eq!(monitor.set_frequency(0), Err(Error::InvalidFrequency));
        assert_eq!(monitor.set_frequency(-5), Err(Error::InvalidFrequency));
        monitor.set_frequency(37).unwrap();
        assert_eq!(monitor.frequency(), Ok(37));
    }

    #[test]
    fn test_start_stop_state_machine() {
        let monitor = monitor();
        assert_eq!(monitor.is_sampling(), Ok(false));
        assert_eq!(monitor.stop(), Err(Error::NotRunning));

        monitor.start().unwrap();
        assert_eq!(monitor.is_sampling(), Ok(true));
        assert_eq!(monitor.start(), Err(Error::AlreadyRunning));

        monitor.stop().unwrap();
        assert_eq!(monitor.is_sampling(), Ok(false));
        assert_eq!(monitor.stop(), Err(Error::NotRunning));

        monitor.start().unwrap();
        monitor.stop().unwrap();
    }

    #[test]
    fn test_teardown_invalidates_handle() {
        let mut monitor = monitor();
        monitor.set_frequency(50).unwrap();
        monitor.start().unwrap();
        thread::sleep(Duration::from_millis(30));

        monitor.teardown().unwrap();
        assert!(!monitor.is_initialized());
        assert_eq!(monitor.teardown(), Err(Error::NotInitialized));
        assert_eq!(monitor.start(), Err(Error::NotInitialized));
        assert_eq!(monitor.stop(), Err(Error::NotInitialized));
        assert_eq!(monitor.set_frequency(0), Err(Error::NotInitialized));
        assert_eq!(monitor.frequency(), Err(Error::NotInitialized));
        assert_eq!(monitor.is_sampling(), Err(Error::NotInitialized));
        assert_eq!(monitor.sensor_count(), Err(Error::NotInitialized));
        assert_eq!(monitor.sensor_names(), Err(Error::NotInitialized));
        assert_eq!(monitor.reset_statistics(), Err(Error::NotInitialized));
        assert!(monitor.latest_snapshot().is_err());
        assert!(monitor.statistics().is_err());
        assert!(monitor.sample_now().is_err());
    }

    #[test]
    fn test_sample_now_only_while_stopped() {
        let monitor = monitor();
        let snapshot = monitor.sample_now().unwrap();
        assert!(snapshot.timestamp.is_some());
        assert_eq!(monitor.statistics().unwrap().total.power.count(), 1);

        monitor.start().unwrap();
        assert_eq!(monitor.sample_now().unwrap_err(), Error::AlreadyRunning);
        monitor.stop().unwrap();
    }

    #[test]
    fn test_zero_frequency_is_init_failure() {
        let catalog = Catalog::from_sensors(vec![Sensor::placeholder("CPU")]).unwrap();
        let result = PowerMonitor::with_catalog(catalog, Box::new(SimulatedSource::seeded(1)), 0);
        assert_eq!(result.err(), Some(Error::InitFailed));
    }

    #[test]
    fn test_monitor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PowerMonitor>();
    }
}
