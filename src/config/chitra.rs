//! Main ChitraConfig and loading.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChitraError, Result};

use super::sections::{FilterSection, GridSection, OutputSection};

/// Full Chitra configuration loaded from TOML
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChitraConfig {
    #[serde(default)]
    pub grid: GridSection,

    #[serde(default)]
    pub filter: FilterSection,

    #[serde(default)]
    pub output: OutputSection,
}

impl ChitraConfig {
    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ChitraError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Load from `chitra.toml` in the working directory, or fall back to defaults
    pub fn load_default() -> Result<Self> {
        let path = Path::new("chitra.toml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ChitraConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        let resolution = self.grid.resolution;
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(ChitraError::Config(format!(
                "grid.resolution must be a positive number, got {}",
                resolution
            )));
        }
        if !(0.0..=100.0).contains(&self.filter.threshold) {
            return Err(ChitraError::Config(format!(
                "filter.threshold must be within 0..=100, got {}",
                self.filter.threshold
            )));
        }
        Ok(())
    }

    /// Output cells per meter
    #[inline]
    pub fn scale(&self) -> f64 {
        1.0 / self.grid.resolution
    }
}
