use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{dlog_debug, Error, Result};

pub const DEFAULT_POOL_SIZE: usize = 2;
pub const DEFAULT_PROGRESS_INCREMENT: u32 = 2;
pub const DEFAULT_INITIAL_WORK_UNITS: u32 = 5;
pub const DEFAULT_WORK_UNITS_STEP: u32 = 1;
pub const DEFAULT_ADDRESS_PREFIX: &str = "192.168.1.1";
pub const DEFAULT_DISPATCH_PACING_MS: u64 = 75;
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Kernel settings, read from `~/.dtk/dtk.toml` when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Number of worker nodes allocated at startup.
    pub pool_size: usize,
    /// Simulated work units a busy node completes per scheduler step.
    pub progress_increment: u32,
    /// Work units required by the first submitted task.
    pub initial_work_units: u32,
    /// Amount each later submission adds to the required work units.
    pub work_units_step: u32,
    /// Node addresses are this prefix followed by the node index.
    pub address_prefix: String,
    /// Cosmetic delay the shell applies after each dispatch.
    pub dispatch_pacing_ms: u64,
    /// Buffer size of event subscriptions.
    pub event_capacity: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            progress_increment: DEFAULT_PROGRESS_INCREMENT,
            initial_work_units: DEFAULT_INITIAL_WORK_UNITS,
            work_units_step: DEFAULT_WORK_UNITS_STEP,
            address_prefix: DEFAULT_ADDRESS_PREFIX.to_string(),
            dispatch_pacing_ms: DEFAULT_DISPATCH_PACING_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl KernelConfig {
    pub fn dtk_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".dtk"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::dtk_dir()?.join("dtk.toml"))
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        dlog_debug!("KernelConfig::load path={}", path.display());
        if !path.exists() {
            dlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        dlog_debug!(
            "Config loaded: pool_size={}, increment={}, initial_work={}",
            config.pool_size,
            config.progress_increment,
            config.initial_work_units
        );
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        dlog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool_size == 0 {
            return Err(Error::Validation(
                "pool_size must be at least 1".to_string(),
            ));
        }
        if self.progress_increment == 0 {
            return Err(Error::Validation(
                "progress_increment must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Locator string for the node at `index`.
    pub fn node_address(&self, index: usize) -> String {
        format!("{}{}", self.address_prefix, index)
    }
}
