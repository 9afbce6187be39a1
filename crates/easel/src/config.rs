// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::animation::AnimationPreset;
use crate::error::{ConfigError, ConfigResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Engine configuration, loaded from YAML with environment overrides.
/// Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub streaming: StreamingConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_advisor_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_sample_rows")]
    pub max_sample_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamingConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

/// Thresholds for large-dataset handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    #[serde(default = "default_large_data_threshold")]
    pub large_data_threshold: usize,
    #[serde(default = "default_progressive_chunk_size")]
    pub progressive_chunk_size: usize,
    #[serde(default = "default_progressive_threshold")]
    pub progressive_threshold: usize,
    #[serde(default = "default_large_mode_threshold")]
    pub large_mode_threshold: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_entrance_delay_ms")]
    pub entrance_delay_ms: u64,
    #[serde(default = "default_preset")]
    pub default_preset: String,
}

fn default_advisor_timeout_ms() -> u64 {
    10_000
}
fn default_max_sample_rows() -> usize {
    5
}
fn default_batch_size() -> usize {
    50
}
fn default_batch_delay_ms() -> u64 {
    100
}
fn default_large_data_threshold() -> usize {
    1000
}
fn default_progressive_chunk_size() -> usize {
    500
}
fn default_progressive_threshold() -> usize {
    3000
}
fn default_large_mode_threshold() -> usize {
    2000
}
fn default_entrance_delay_ms() -> u64 {
    100
}
fn default_preset() -> String {
    "smooth".to_string()
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            timeout_ms: default_advisor_timeout_ms(),
            max_sample_rows: default_max_sample_rows(),
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            large_data_threshold: default_large_data_threshold(),
            progressive_chunk_size: default_progressive_chunk_size(),
            progressive_threshold: default_progressive_threshold(),
            large_mode_threshold: default_large_mode_threshold(),
        }
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            entrance_delay_ms: default_entrance_delay_ms(),
            default_preset: default_preset(),
        }
    }
}

impl AdvisorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl StreamingConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl AnimationConfig {
    pub fn entrance_delay(&self) -> Duration {
        Duration::from_millis(self.entrance_delay_ms)
    }
}

impl EngineConfig {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        info!("Loading engine configuration from: {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ConfigFileError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `EASEL_*` variables from the process environment, loading a
    /// `.env` file first when one is present.
    pub fn with_env_overrides(mut self) -> ConfigResult<Self> {
        dotenv().ok();
        if let Ok(endpoint) = std::env::var("EASEL_ADVISOR_ENDPOINT") {
            debug!("Advisor endpoint overridden from environment");
            self.advisor.endpoint = Some(endpoint);
        }
        if let Some(enabled) = env_parsed::<bool>("EASEL_ADVISOR_ENABLED")? {
            self.advisor.enabled = enabled;
        }
        if let Some(timeout_ms) = env_parsed::<u64>("EASEL_ADVISOR_TIMEOUT_MS")? {
            self.advisor.timeout_ms = timeout_ms;
        }
        if let Some(batch_size) = env_parsed::<usize>("EASEL_BATCH_SIZE")? {
            self.streaming.batch_size = batch_size;
        }
        if let Some(delay) = env_parsed::<u64>("EASEL_BATCH_DELAY_MS")? {
            self.streaming.batch_delay_ms = delay;
        }
        if let Some(threshold) = env_parsed::<usize>("EASEL_LARGE_DATA_THRESHOLD")? {
            self.optimizer.large_data_threshold = threshold;
        }
        self.validate()?;
        Ok(self)
    }

    /// Full check, including the endpoint the built-in HTTP advisor needs.
    pub fn validate(&self) -> ConfigResult<()> {
        self.validate_values()?;
        if self.advisor.enabled && self.advisor.endpoint.is_none() {
            return Err(ConfigError::MissingRequiredConfig {
                field: "advisor.endpoint".to_string(),
            });
        }
        Ok(())
    }

    /// Range checks only; no advisor endpoint is required.
    pub fn validate_values(&self) -> ConfigResult<()> {
        if self.streaming.batch_size == 0 {
            return Err(invalid("streaming.batch_size", 0));
        }
        if self.optimizer.large_data_threshold == 0 {
            return Err(invalid("optimizer.large_data_threshold", 0));
        }
        if self.optimizer.progressive_chunk_size == 0 {
            return Err(invalid("optimizer.progressive_chunk_size", 0));
        }
        if self.optimizer.progressive_threshold == 0 {
            return Err(invalid("optimizer.progressive_threshold", 0));
        }
        if self.optimizer.large_mode_threshold == 0 {
            return Err(invalid("optimizer.large_mode_threshold", 0));
        }
        if self.advisor.max_sample_rows > 5 {
            return Err(invalid(
                "advisor.max_sample_rows",
                self.advisor.max_sample_rows,
            ));
        }
        if self
            .animation
            .default_preset
            .parse::<AnimationPreset>()
            .is_err()
        {
            return Err(invalid(
                "animation.default_preset",
                &self.animation.default_preset,
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> ConfigResult<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| invalid(key, raw)),
        Err(_) => Ok(None),
    }
}
