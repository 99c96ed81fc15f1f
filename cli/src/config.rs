use std::fs;
use std::path::PathBuf;

use pwmon_engine::{MonitorConfig, SourceMode, DEFAULT_FREQUENCY_HZ};
use serde::{Deserialize, Serialize};
use tracing::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "off" | "none" => LogLevel::Off,
            "error" => LogLevel::Error,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Warn,
        }
    }

    pub fn as_tracing_level(&self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub frequency_hz: u32,
    pub duration_secs: u64,
    pub source: SourceMode,
    pub log_level: LogLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supply_root: Option<PathBuf>,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            duration_secs: 10,
            source: SourceMode::Auto,
            log_level: LogLevel::Warn,
            bus_root: None,
            supply_root: None,
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("pwmon")
}

pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("pwmon")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

pub fn ensure_dirs() -> std::io::Result<()> {
    fs::create_dir_all(config_dir())
}

impl UserConfig {
    pub fn load() -> Self {
        let path = config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> Self {
        toml::from_str(content).unwrap_or_default()
    }

    pub fn save(&self) -> std::io::Result<()> {
        let _ = ensure_dirs();
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        fs::write(config_path(), content)
    }

    /// Builds the engine configuration. The testing flag comes from the
    /// environment or the command line; explicit roots override the
    /// defaults of either mode.
    pub fn monitor_config(&self, testing: bool, simulate: bool) -> MonitorConfig {
        let base = if testing {
            MonitorConfig::testing()
        } else {
            MonitorConfig::from_env()
        };

        let bus_root = self.bus_root.clone().unwrap_or_else(|| base.bus_root.clone());
        let supply_root = self
            .supply_root
            .clone()
            .unwrap_or_else(|| base.supply_root.clone());
        let source = if simulate {
            SourceMode::Simulated
        } else {
            self.source
        };

        base.with_roots(bus_root, supply_root)
            .with_frequency(self.frequency_hz)
            .with_source(source)
    }
}
