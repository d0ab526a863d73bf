//! Configuration for neighbourhood processing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NbhoodError, Result};

/// Largest kernel half-width, in grid cells, that is ever allowed.
pub const MAX_KERNEL_CELL_RADIUS: usize = 500;

/// Configuration for the neighbourhood processor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NbhoodConfig {
    /// Use a constant-weight circle instead of weights falling off with radius.
    pub unweighted_mode: bool,

    /// Worker threads for kernel application (None = all available).
    pub threads: Option<usize>,

    /// Kernel half-width limit in grid cells.
    pub max_kernel_cell_radius: usize,
}

impl Default for NbhoodConfig {
    fn default() -> Self {
        Self {
            unweighted_mode: false,
            threads: None,
            max_kernel_cell_radius: MAX_KERNEL_CELL_RADIUS,
        }
    }
}

impl NbhoodConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("NBHOOD_UNWEIGHTED") {
            config.unweighted_mode = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("NBHOOD_THREADS") {
            if let Ok(n) = val.parse() {
                config.threads = Some(n);
            }
        }

        if let Ok(val) = std::env::var("NBHOOD_MAX_KERNEL_CELLS") {
            if let Ok(cells) = val.parse() {
                config.max_kernel_cell_radius = cells;
            }
        }

        config
    }

    /// Load configuration from a YAML file. Missing keys take their defaults.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            NbhoodError::config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.threads == Some(0) {
            return Err("threads must be > 0".to_string());
        }

        if self.max_kernel_cell_radius == 0 {
            return Err("max_kernel_cell_radius must be > 0".to_string());
        }

        if self.max_kernel_cell_radius > MAX_KERNEL_CELL_RADIUS {
            return Err(format!(
                "max_kernel_cell_radius must be <= {}",
                MAX_KERNEL_CELL_RADIUS
            ));
        }

        Ok(())
    }
}
