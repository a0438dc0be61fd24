//! Engine configuration, read from a TOML file such as `heapimp.toml`.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::allocator::AllocPolicy;

/// Missing fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Which fresh block `cons` picks.
    pub allocator: AllocPolicy,

    /// Rule applications allowed per big-step run.
    pub big_step_fuel: u64,

    /// Reductions allowed per small-step run.
    pub small_step_fuel: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allocator: AllocPolicy::default(),
            big_step_fuel: 100_000,
            small_step_fuel: 1_000_000,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.big_step_fuel == 0 {
            return Err(anyhow!("big_step_fuel must be > 0"));
        }
        if self.small_step_fuel == 0 {
            return Err(anyhow!("small_step_fuel must be > 0"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `EngineConfig::default()`.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: EngineConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}
