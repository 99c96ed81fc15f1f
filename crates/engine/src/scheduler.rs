//! Background sampling loop.
//!
//! One thread per running sampler. Each tick reads every sensor without
//! holding the state lock, then takes the lock once to publish the snapshot
//! and fold it into the statistics. The wait between ticks listens on the
//! stop channel, so `stop` returns as soon as the current read finishes.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use pwmon_platform::{Catalog, SampleSource};
use tracing::{debug, error, info, trace, warn};

use crate::error::{Error, Result};
use crate::reading::{read_snapshot, Snapshot};
use crate::stats::StatisticsSet;

const THREAD_NAME: &str = "pwmon-sampler";

/// State shared between the sampler (sole writer) and callers.
#[derive(Debug)]
pub(crate) struct Shared {
    pub snapshot: Snapshot,
    pub stats: StatisticsSet,
}

/// Locks `mutex`, recovering the data if a previous holder panicked.
///
/// Every writer replaces the guarded values as a whole, so a poisoned lock
/// still holds a consistent state.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything a tick needs.
#[derive(Clone)]
pub(crate) struct Pipeline {
    pub catalog: Arc<Catalog>,
    pub source: Arc<Mutex<Box<dyn SampleSource>>>,
    pub shared: Arc<Mutex<Shared>>,
    pub frequency_hz: Arc<AtomicU32>,
}

impl Pipeline {
    /// Reads all sensors, then publishes and folds the result. On error the
    /// published snapshot and statistics are left untouched.
    pub fn tick(&self) -> Result<()> {
        let snapshot = {
            let mut source = lock(&self.source);
            read_snapshot(&self.catalog, &mut **source)?
        };

        let mut shared = lock(&self.shared);
        shared.stats.fold(&snapshot);
        shared.snapshot = snapshot;
        trace!(total_watts = shared.snapshot.total.power, "Sample stored");
        Ok(())
    }

    /// Wait between ticks at the currently configured frequency.
    pub fn period(&self) -> Duration {
        let hz = self.frequency_hz.load(Ordering::Relaxed).max(1);
        Duration::from_secs(1) / hz
    }
}

/// Handle to a running sampling thread.
pub(crate) struct Sampler {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl Sampler {
    /// Spawns the sampling thread and waits until it is running.
    pub fn spawn(pipeline: Pipeline) -> Result<Self> {
        let (stop_tx, stop_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                let _ = ready_tx.send(());
                run(&pipeline, &stop_rx);
            })
            .map_err(|e| {
                error!(error = %e, "Failed to spawn sampler thread");
                Error::ThreadCreateFailed
            })?;

        if ready_rx.recv().is_err() {
            error!("Sampler thread exited before starting");
            let _ = handle.join();
            return Err(Error::ThreadCreateFailed);
        }

        Ok(Self { stop_tx, handle })
    }

    /// Signals the thread and blocks until it has exited.
    pub fn stop(self) {
        // A send error means the thread is already gone; join reports why
        let _ = self.stop_tx.send(());
        if self.handle.join().is_err() {
            error!("Sampler thread panicked");
        }
    }
}

fn run(pipeline: &Pipeline, stop_rx: &mpsc::Receiver<()>) {
    info!(
        frequency_hz = pipeline.frequency_hz.load(Ordering::Relaxed),
        sensors = pipeline.catalog.len(),
        "Sampling started"
    );

    let mut ticks: u64 = 0;
    let mut skipped: u64 = 0;
    loop {
        match pipeline.tick() {
            Ok(()) => ticks += 1,
            Err(e) => {
                skipped += 1;
                warn!(error = %e, "Skipping sampling cycle");
            }
        }

        match stop_rx.recv_timeout(pipeline.period()) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!(ticks, skipped, "Sampling stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pwmon_platform::{Sensor, SimulatedSource};

    fn pipeline(hz: u32) -> Pipeline {
        let catalog =
            Catalog::from_sensors(vec![Sensor::placeholder("CPU"), Sensor::placeholder("GPU")])
                .unwrap();
        let shared = Shared {
            snapshot: Snapshot::empty(&catalog).unwrap(),
            stats: StatisticsSet::new(&catalog).unwrap(),
        };
        let source: Box<dyn SampleSource> = Box::new(SimulatedSource::seeded(5));
        Pipeline {
            catalog: Arc::new(catalog),
            source: Arc::new(Mutex::new(source)),
            shared: Arc::new(Mutex::new(shared)),
            frequency_hz: Arc::new(AtomicU32::new(hz)),
        }
    }

    #[test]
    fn test_period_tracks_frequency() {
        let p = pipeline(4);
        assert_eq!(p.period(), Duration::from_millis(250));
        p.frequency_hz.store(1000, Ordering::Relaxed);
        assert_eq!(p.period(), Duration::from_millis(1));
        p.frequency_hz.store(0, Ordering::Relaxed);
        assert_eq!(p.period(), Duration::from_secs(1));
    }

    #[test]
    fn test_tick_publishes_and_folds() {
        let p = pipeline(1);
        p.tick().unwrap();
        p.tick().unwrap();

        let shared = lock(&p.shared);
        assert!(shared.snapshot.timestamp.is_some());
        assert_eq!(shared.stats.total.power.count(), 2);
        assert_eq!(shared.stats.sensors[1].current.count(), 2);
    }

    #[test]
    fn test_sampler_runs_until_stopped() {
        let p = pipeline(200);
        let sampler = Sampler::spawn(p.clone()).unwrap();
        thread::sleep(Duration::from_millis(100));
        sampler.stop();

        let after_stop = lock(&p.shared).stats.total.power.count();
        assert!(after_stop >= 1);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(lock(&p.shared).stats.total.power.count(), after_stop);
    }

    #[test]
    fn test_stop_interrupts_long_wait() {
        let p = pipeline(1);
        let sampler = Sampler::spawn(p).unwrap();
        let started = std::time::Instant::now();
        sampler.stop();
        assert!(started.elapsed() < Duration::from_millis(900));
    }
}
