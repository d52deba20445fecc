// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Kernel configuration system

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by [`KernelConfig::load`]
pub const CONFIG_FILE: &str = "geokernel.toml";

/// Tolerances and switches for [`crate::NativeKernel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Distance under which a point counts as lying on a splitting plane
    pub plane_epsilon: f64,
    /// Distance under which two result vertices are merged
    pub weld_tolerance: f64,
    /// Reject boolean inputs that have border edges
    pub require_closed_inputs: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            plane_epsilon: 1e-5,
            weld_tolerance: 1e-7,
            require_closed_inputs: true,
        }
    }
}

impl KernelConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: KernelConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `GEOKERNEL_*` overrides read through `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("GEOKERNEL_PLANE_EPSILON") {
            self.plane_epsilon = value
                .parse()
                .with_context(|| format!("GEOKERNEL_PLANE_EPSILON is not a number: {value}"))?;
        }

        if let Some(value) = lookup("GEOKERNEL_WELD_TOLERANCE") {
            self.weld_tolerance = value
                .parse()
                .with_context(|| format!("GEOKERNEL_WELD_TOLERANCE is not a number: {value}"))?;
        }

        if let Some(value) = lookup("GEOKERNEL_REQUIRE_CLOSED") {
            self.require_closed_inputs = value
                .parse()
                .with_context(|| format!("GEOKERNEL_REQUIRE_CLOSED is not true or false: {value}"))?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(self.plane_epsilon.is_finite() && self.plane_epsilon > 0.0) {
            anyhow::bail!("plane_epsilon must be positive, got {}", self.plane_epsilon);
        }
        if !(self.weld_tolerance.is_finite() && self.weld_tolerance >= 0.0) {
            anyhow::bail!("weld_tolerance must be non-negative, got {}", self.weld_tolerance);
        }
        Ok(())
    }
}
