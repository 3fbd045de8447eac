// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulator configuration
//!
//! Read from an optional TOML file; command-line flags override file values.
//!
//! ```toml
//! [watchdog]
//! stall_threshold = "5s"
//!
//! [simulate]
//! max_delay = "40ms"
//! ```

use evo_core::JoinConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvoConfig {
    pub watchdog: JoinConfig,
    pub simulate: SimulateConfig,
}

/// Timing of the simulated animations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulateConfig {
    /// Upper bound for a single animation's duration
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for SimulateConfig {
    fn default() -> Self {
        Self {
            max_delay: Duration::from_millis(40),
        }
    }
}

impl EvoConfig {
    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_stall_threshold(mut self, threshold: Option<Duration>) -> Self {
        if let Some(threshold) = threshold {
            self.watchdog.stall_threshold = Some(threshold);
        }
        self
    }

    pub fn with_max_delay(mut self, max_delay: Option<Duration>) -> Self {
        if let Some(max_delay) = max_delay {
            self.simulate.max_delay = max_delay;
        }
        self
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
