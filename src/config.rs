use std::path::Path;

use serde::{Deserialize, Serialize};
use wayfinder_core::{BuildConfig, EngineConfig, Error};

/// Route result cache limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
    /// `0` disables caching
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 60,
            max_entries: 10_000,
        }
    }
}

/// Service configuration, usually read from a TOML file:
///
/// ```toml
/// ignore_unknown_options = true
///
/// [build]
/// altitude_tolerance = 0.05
///
/// [engine]
/// restriction_penalty = 3.0
///
/// [cache]
/// ttl_secs = 30
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub build: BuildConfig,
    pub engine: EngineConfig,
    pub cache: CacheConfig,
    /// Skip unknown keys in request option overrides instead of rejecting them
    pub ignore_unknown_options: bool,
}

impl ServiceConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        let config: ServiceConfig =
            toml::from_str(source).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to read config '{}': {}", path.display(), e),
            )
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.build.validate()?;
        self.engine.validate()
    }
}
