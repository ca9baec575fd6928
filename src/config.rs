// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Engine configuration system

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default file looked up by [`EngineConfig::load`]
pub const CONFIG_FILE: &str = "solidbool.toml";

/// Default linear tolerance used for point equality and side tests
pub const DEFAULT_EPSILON: f64 = 1e-10;

/// Numeric tolerances threaded through every geometric predicate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Distance below which two points are the same point
    pub linear: f64,
    /// Sine of the angle below which two directions are parallel
    pub angular: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            linear: DEFAULT_EPSILON,
            angular: DEFAULT_EPSILON,
        }
    }
}

impl Tolerance {
    pub fn new(linear: f64) -> Self {
        Self {
            linear,
            angular: linear,
        }
    }

    /// Squared linear tolerance, for comparisons against squared distances
    pub fn linear_sq(&self) -> f64 {
        self.linear * self.linear
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Geometric tolerances
    pub tolerance: Tolerance,
    /// Check partner symmetry and loop closure of every rebuilt mesh
    pub validate_output: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            validate_output: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: EngineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `SOLIDBOOL_*` environment variables on top of the current values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(eps) = std::env::var("SOLIDBOOL_EPSILON") {
            if let Ok(value) = eps.parse::<f64>() {
                if value > 0.0 {
                    self.tolerance = Tolerance::new(value);
                }
            }
        }

        if let Ok(validate) = std::env::var("SOLIDBOOL_VALIDATE") {
            self.validate_output = validate.parse().unwrap_or(self.validate_output);
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
