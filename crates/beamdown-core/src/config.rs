//! Configuration directory resolution and `settings.toml` loading.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use eyre::{bail, eyre, Result, WrapErr};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::catalog::{PlatformCatalog, PlatformEntry, DEFAULT_PLATFORM};
use crate::rate::{UniformRate, DEFAULT_MAX_RATE, DEFAULT_MIN_RATE};
use crate::simulator::{SimulatorConfig, DEFAULT_RESET_DELAY, DEFAULT_TICK_INTERVAL};

pub const SETTINGS_FILE: &str = "settings.toml";

static CONFIG_DIR_OVERRIDE: Lazy<RwLock<Option<PathBuf>>> = Lazy::new(|| RwLock::new(None));

/// Override the configuration directory for the current process.
/// Subsequent calls replace the previous override.
pub fn set_config_dir<P: AsRef<Path>>(path: P) {
    *CONFIG_DIR_OVERRIDE.write() = Some(path.as_ref().to_path_buf());
}

/// Clear any previously configured override.
pub fn clear_config_dir_override() {
    CONFIG_DIR_OVERRIDE.write().take();
}

/// Return the current override path, if one has been set.
pub fn config_dir_override() -> Option<PathBuf> {
    CONFIG_DIR_OVERRIDE.read().clone()
}

/// Resolve the configuration directory.
/// Priority: explicit override -> platform standard -> ~/.config/beamdown
pub fn config_dir() -> Result<PathBuf> {
    if let Some(path) = config_dir_override() {
        return Ok(path);
    }

    if let Some(proj) = ProjectDirs::from("com", "Beamdown", "Beamdown") {
        return Ok(proj.config_dir().to_path_buf());
    }

    if let Some(base) = BaseDirs::new() {
        return Ok(base.home_dir().join(".config").join("beamdown"));
    }

    Err(eyre!(
        "unable to determine configuration directory for beamdown (no override and no platform default)"
    ))
}

/// Contents of `settings.toml`. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulatorSettings {
    pub tick_interval_ms: u64,
    pub reset_delay_ms: u64,
    pub min_rate: f64,
    pub max_rate: f64,
    /// Fixed seed for reproducible rates; entropy when absent.
    pub seed: Option<u64>,
    pub default_platform: String,
    pub platforms: BTreeMap<String, PlatformEntry>,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        let catalog = PlatformCatalog::builtin();
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            reset_delay_ms: DEFAULT_RESET_DELAY.as_millis() as u64,
            min_rate: DEFAULT_MIN_RATE,
            max_rate: DEFAULT_MAX_RATE,
            seed: None,
            default_platform: DEFAULT_PLATFORM.to_string(),
            platforms: catalog
                .iter()
                .map(|(id, entry)| (id.to_string(), entry.clone()))
                .collect(),
        }
    }
}

impl SimulatorSettings {
    /// Load `settings.toml` from the resolved config directory, or defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join(SETTINGS_FILE);
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no settings at {}; using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read settings file: {}", path.display()))?;
        let settings = Self::from_toml(&content)
            .wrap_err_with(|| format!("invalid settings file: {}", path.display()))?;
        log::debug!("loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: SimulatorSettings =
            toml::from_str(content).wrap_err("failed to parse settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than zero");
        }
        if !(self.min_rate.is_finite() && self.min_rate > 0.0) {
            bail!("min_rate must be positive, got {}", self.min_rate);
        }
        if !(self.max_rate.is_finite() && self.max_rate >= self.min_rate) {
            bail!(
                "max_rate ({}) must be at least min_rate ({})",
                self.max_rate,
                self.min_rate
            );
        }
        self.catalog().map(|_| ())
    }

    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            reset_delay: Duration::from_millis(self.reset_delay_ms),
        }
    }

    pub fn rate_sampler(&self) -> UniformRate {
        UniformRate::new(self.min_rate, self.max_rate, self.seed)
    }

    pub fn catalog(&self) -> Result<PlatformCatalog> {
        PlatformCatalog::new(&self.default_platform, self.platforms.clone())
    }
}
