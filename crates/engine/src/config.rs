use std::path::PathBuf;

use pwmon_platform::{DiscoveryConfig, SampleSource, SimulatedSource, SysfsSource};
use serde::{Deserialize, Serialize};

/// Environment variable that switches the engine into testing mode.
pub const TESTING_ENV: &str = "PWMON_TESTING";
pub const DEFAULT_FREQUENCY_HZ: u32 = 1;

/// Which backend feeds the sampling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Simulated in testing mode, sysfs otherwise.
    #[default]
    Auto,
    Sysfs,
    Simulated,
}

impl SourceMode {
    pub fn label(&self) -> &'static str {
        match self {
            SourceMode::Auto => "auto",
            SourceMode::Sysfs => "sysfs",
            SourceMode::Simulated => "simulated",
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub frequency_hz: u32,
    pub bus_root: PathBuf,
    pub supply_root: PathBuf,
    pub source: SourceMode,
    pub testing: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let discovery = DiscoveryConfig::default();
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            bus_root: discovery.bus_root,
            supply_root: discovery.supply_root,
            source: SourceMode::Auto,
            testing: false,
        }
    }
}

impl MonitorConfig {
    /// Default configuration, switched to testing mode when
    /// [`TESTING_ENV`] is set.
    pub fn from_env() -> Self {
        if std::env::var_os(TESTING_ENV).is_some() {
            Self::testing()
        } else {
            Self::default()
        }
    }

    /// Fake sysfs roots, placeholder sensors and simulated values.
    pub fn testing() -> Self {
        let discovery = DiscoveryConfig::testing();
        Self {
            bus_root: discovery.bus_root,
            supply_root: discovery.supply_root,
            testing: true,
            ..Self::default()
        }
    }

    pub fn with_frequency(mut self, hz: u32) -> Self {
        self.frequency_hz = hz;
        self
    }

    pub fn with_roots(mut self, bus_root: impl Into<PathBuf>, supply_root: impl Into<PathBuf>) -> Self {
        self.bus_root = bus_root.into();
        self.supply_root = supply_root.into();
        self
    }

    pub fn with_source(mut self, source: SourceMode) -> Self {
        self.source = source;
        self
    }

    pub fn discovery(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            bus_root: self.bus_root.clone(),
            supply_root: self.supply_root.clone(),
            allow_placeholders: self.testing,
        }
    }

    /// The backend `Auto` stands for under this configuration.
    pub fn resolved_source(&self) -> SourceMode {
        match self.source {
            SourceMode::Auto if self.testing => SourceMode::Simulated,
            SourceMode::Auto => SourceMode::Sysfs,
            explicit => explicit,
        }
    }

    pub(crate) fn build_source(&self) -> Box<dyn SampleSource> {
        match self.resolved_source() {
            SourceMode::Simulated => Box::new(SimulatedSource::new()),
            _ => Box::new(SysfsSource::new()),
        }
    }
}
