//! Pipeline configuration, loaded from TOML.
//!
//! Every section is optional; an empty file yields the defaults.
//!
//! ```toml
//! [storage]
//! base_path = "/srv/nepselab"
//! exchange = "nepse"
//!
//! [features.weights]
//! rsi = 0.30
//! macd = 0.25
//! mfi = 0.20
//! stoch = 0.15
//! trend = 0.10
//!
//! [aggregation]
//! cleaned_dedup = "keep_first"
//! featured_dedup = "keep_last"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use nepselab_core::features::{FeatureConfig, FeatureConfigError};

use crate::store::StoreLayout;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("invalid feature config: {0}")]
    Features(#[from] FeatureConfigError),
}

/// Which record survives when a batch holds the same key twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    KeepFirst,
    KeepLast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `data/`.
    pub base_path: PathBuf,
    /// Exchange segment of the store paths.
    pub exchange: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            exchange: "nepse".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub cleaned_dedup: DedupPolicy,
    pub featured_dedup: DedupPolicy,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            cleaned_dedup: DedupPolicy::KeepFirst,
            featured_dedup: DedupPolicy::KeepLast,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub storage: StorageConfig,
    pub features: FeatureConfig,
    pub aggregation: AggregationConfig,
}

impl PipelineConfig {
    /// Defaults rooted at `base_path`.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            storage: StorageConfig {
                base_path: base_path.into(),
                ..StorageConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.exchange.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.exchange must not be empty".into()));
        }
        Ok(self.features.validate()?)
    }

    pub fn layout(&self) -> StoreLayout {
        StoreLayout::new(&self.storage.base_path, &self.storage.exchange)
    }
}
