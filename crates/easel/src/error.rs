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

use easel_contracts::AdvisorError;
use thiserror::Error;

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum EaselError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Advisor error: {0}")]
    Advisor(#[from] AdvisorError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Row {row} has {found} values but the dataset declares {expected} columns")]
    RowLengthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Duplicate column name found: '{name}'")]
    DuplicateColumn { name: String },
    #[error("Column type metadata has {found} entries for {expected} columns")]
    ColumnTypeLengthMismatch { expected: usize, found: usize },
    #[error("Malformed dataset payload: {reason}")]
    MalformedPayload { reason: String },
}

/// Errors raised while loading or checking configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    ConfigFileError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse YAML configuration: {source}")]
    YamlParseError {
        #[from]
        source: serde_yaml::Error,
    },
    #[error("Invalid configuration: {field} = {value}")]
    InvalidValue { field: String, value: String },
    #[error("Missing required configuration: {field}")]
    MissingRequiredConfig { field: String },
}

pub type Result<T> = std::result::Result<T, EaselError>;
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl EaselError {
    /// Advisor failures are absorbed by the heuristic fallback; everything
    /// else is surfaced to the caller unchanged.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EaselError::Advisor(_))
    }

    pub fn category(&self) -> &'static str {
        match self {
            EaselError::Validation(_) => "validation",
            EaselError::Config(_) => "config",
            EaselError::Advisor(_) => "advisor",
        }
    }
}
