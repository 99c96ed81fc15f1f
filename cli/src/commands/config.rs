use color_eyre::eyre::Result;
use pwmon_engine::MonitorConfig;

use crate::config::{config_path, UserConfig};
use crate::logging;

pub fn run(path: bool, reset: bool, engine: &MonitorConfig) -> Result<()> {
    let config_file = config_path();

    if path {
        println!("{}", config_file.display());
        return Ok(());
    }

    if reset {
        let config = UserConfig::default();
        config.save()?;
        println!("Config reset to defaults at: {}", config_file.display());
        return Ok(());
    }

    let config = UserConfig::load();
    println!("Config file: {}", config_file.display());
    println!("Log directory: {}", logging::log_dir().display());
    println!();
    println!("{}", toml::to_string_pretty(&config)?);
    println!("{}", effective_settings(engine));

    Ok(())
}

/// What the engine will actually use once flags and environment are applied.
fn effective_settings(engine: &MonitorConfig) -> String {
    format!(
        "# effective\nsample source: {} ({})\nbus root: {}\nsupply root: {}\ntesting: {}",
        engine.resolved_source().label(),
        engine.source.label(),
        engine.bus_root.display(),
        engine.supply_root.display(),
        engine.testing
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_settings_resolve_auto_source() {
        let text = effective_settings(&MonitorConfig::testing());
        assert!(text.contains("sample source: simulated (auto)"));
        assert!(text.contains("bus root: /fake_sys/bus/i2c/devices"));
        assert!(text.contains("testing: true"));
    }
}
