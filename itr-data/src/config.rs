//! Application configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) yields a
//! working configuration with the built-in 2024-25 rules.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "returns.db"
//!
//! [filing]
//! owner_id = "ABCPR1234D"
//! assessment_year = "2024-25"
//!
//! [rules.new.relief]
//! cess_rate = 0.04
//! rebate_ceiling = 700000
//! rebate_cap = 25000
//! surcharge_tiers = [
//!     { up_to = 5000000, rate = 0 },
//!     { rate = 0.25 },
//! ]
//! ```

use std::path::{Path, PathBuf};

use itr_core::db::DbConfig;
use itr_core::{CreationMetadata, RulesError, TaxRules};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid tax rules: {0}")]
    InvalidRules(#[from] RulesError),
}

/// Defaults for the filer whose documents the tool works on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilingConfig {
    pub owner_id: String,
    pub assessment_year: String,
}

impl Default for FilingConfig {
    fn default() -> Self {
        Self {
            owner_id: "default".to_string(),
            assessment_year: "2024-25".to_string(),
        }
    }
}

/// Overridden by `RUST_LOG` and the command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    pub filing: FilingConfig,
    pub creation: CreationMetadata,
    pub rules: TaxRules,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates a configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(text)?;
        config.rules.validate()?;
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
