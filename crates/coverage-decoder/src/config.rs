//! Decoder configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::domain::DomainType;

/// Default sentinel written to raster cells without data.
pub const DEFAULT_NO_DATA_VALUE: f64 = -9999999.0;

/// Default color of the catch-all "no data" vector category.
pub const DEFAULT_NO_DATA_COLOR: &str = "#ff00ff";

/// Options controlling product construction.
///
/// Every field has a default, so an empty YAML document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Sentinel substituted for null raster cells.
    pub no_data_value: f64,

    /// Append a catch-all category for null values to categorized vector legends.
    pub add_no_data_category: bool,

    /// Color of the catch-all category.
    pub no_data_color: String,

    /// Domain types whose collection members are merged into one vector product.
    pub mergeable_domain_types: Vec<DomainType>,

    /// Decode independent coverages of a collection on the rayon pool.
    pub parallel: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            no_data_value: DEFAULT_NO_DATA_VALUE,
            add_no_data_category: true,
            no_data_color: DEFAULT_NO_DATA_COLOR.to_string(),
            mergeable_domain_types: vec![
                DomainType::Trajectory,
                DomainType::PointSeries,
                DomainType::Point,
            ],
            parallel: true,
        }
    }
}

impl DecoderConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_yaml_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded decoder config");
        Ok(config)
    }

    pub fn with_no_data_value(mut self, value: f64) -> Self {
        self.no_data_value = value;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check if coverages of this domain type are merged.
    pub fn is_mergeable(&self, domain_type: DomainType) -> bool {
        self.mergeable_domain_types.contains(&domain_type)
    }
}

/// Errors loading a [`DecoderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
