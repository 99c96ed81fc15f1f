use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sensor::{Sensor, SensorKind};
use crate::source::{RawReading, SampleSource};

/// Nominal values and noise span per sensor kind.
#[derive(Debug, Clone, Copy)]
struct Profile {
    voltage: f64,
    current: f64,
    noise: f64,
}

const BUS_PROFILE: Profile = Profile {
    voltage: 3.3,
    current: 0.5,
    noise: 0.05,
};

const SUPPLY_PROFILE: Profile = Profile {
    voltage: 5.0,
    current: 1.0,
    noise: 0.1,
};

/// Synthesizes plausible readings without touching hardware.
///
/// Values sit at a per-kind nominal level with uniform noise of
/// `±noise / 2`. Useful on development machines and in tests.
pub struct SimulatedSource {
    rng: StdRng,
}

impl SimulatedSource {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic output for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn jitter(&mut self, noise: f64) -> f64 {
        self.rng.random_range(-0.5..0.5) * noise
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for SimulatedSource {
    fn read(&mut self, sensor: &Sensor) -> RawReading {
        let profile = match sensor.kind() {
            SensorKind::BusMonitor => BUS_PROFILE,
            SensorKind::SystemSupply => SUPPLY_PROFILE,
        };
        let voltage = profile.voltage + self.jitter(profile.noise);
        let current = profile.current + self.jitter(profile.noise);
        RawReading::online(voltage, current)
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::ChannelLayout;

    #[test]
    fn test_values_stay_within_noise_band() {
        let mut source = SimulatedSource::seeded(7);
        let bus = Sensor::bus_channel("VDD_IN", "/nonexistent", 1, ChannelLayout::Hwmon);
        let supply = Sensor::placeholder("CPU");

        for _ in 0..500 {
            let r = source.read(&bus);
            assert!(r.online);
            assert!((r.voltage - 3.3).abs() <= 0.025);
            assert!((r.current - 0.5).abs() <= 0.025);

            let r = source.read(&supply);
            assert!((r.voltage - 5.0).abs() <= 0.05);
            assert!((r.current - 1.0).abs() <= 0.05);
        }
    }

    #[test]
    fn test_seeded_sources_agree() {
        let sensor = Sensor::placeholder("GPU");
        let mut a = SimulatedSource::seeded(42);
        let mut b = SimulatedSource::seeded(42);
        for _ in 0..10 {
            assert_eq!(a.read(&sensor), b.read(&sensor));
        }
    }
}
