use beamdown_core::config::{self, SimulatorSettings};
use beamdown_core::PlatformCatalog;
use eyre::{Result, WrapErr};

#[derive(Debug, Clone)]
pub struct AppContext {
    pub settings: SimulatorSettings,
    pub catalog: PlatformCatalog,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let settings = SimulatorSettings::load().wrap_err_with(|| {
            match config::config_dir() {
                Ok(dir) => format!("loading settings from {}", dir.display()),
                Err(_) => "loading settings".to_string(),
            }
        })?;
        let catalog = settings.catalog()?;
        Ok(Self { settings, catalog })
    }
}
