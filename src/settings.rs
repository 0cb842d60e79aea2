//! Layered monitor configuration.
//!
//! Sources, lowest precedence first: built-in defaults, an optional config
//! file with a `[monitor]` table, `DEVICE_DOCTOR_MONITOR__<FIELD>`
//! environment variables, then command line overrides.
//!
//! ```toml
//! [monitor]
//! event_capacity = 20
//! battery_critical = 10
//! disk_critical_ratio = 0.05
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, ConfigError, Environment, File};

use crate::data::MonitorConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "DEVICE_DOCTOR";

/// Values given on the command line. `None` keeps the layered value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub event_capacity: Option<usize>,
    pub battery_critical: Option<u8>,
    pub temperature_warning: Option<f32>,
    pub volume_warning: Option<f32>,
    pub disk_critical_ratio: Option<f64>,
}

impl Overrides {
    pub fn apply(&self, config: &mut MonitorConfig) {
        if let Some(capacity) = self.event_capacity {
            config.event_capacity = capacity;
        }
        if let Some(level) = self.battery_critical {
            config.battery_critical = level;
        }
        if let Some(celsius) = self.temperature_warning {
            config.temperature_warning = celsius;
        }
        if let Some(volume) = self.volume_warning {
            config.volume_warning = volume;
        }
        if let Some(ratio) = self.disk_critical_ratio {
            config.disk_critical_ratio = ratio;
        }
    }
}

/// Load the monitor configuration from `path` (if any) and the environment.
pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<MonitorConfig> {
    let mut builder = Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path));
    }
    let layered = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to load configuration")?;

    let mut config = match layered.get::<MonitorConfig>("monitor") {
        Ok(config) => config,
        Err(ConfigError::NotFound(_)) => MonitorConfig::default(),
        Err(e) => return Err(e).context("invalid [monitor] configuration"),
    };
    overrides.apply(&mut config);
    Ok(config)
}
