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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Chart kinds the engine can recommend. Serialized lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Scatter,
    Radar,
    Heatmap,
}

impl ChartType {
    /// Every variant, in declaration order.
    pub const ALL: [ChartType; 6] = [
        ChartType::Bar,
        ChartType::Line,
        ChartType::Pie,
        ChartType::Scatter,
        ChartType::Radar,
        ChartType::Heatmap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Bar => "bar",
            ChartType::Line => "line",
            ChartType::Pie => "pie",
            ChartType::Scatter => "scatter",
            ChartType::Radar => "radar",
            ChartType::Heatmap => "heatmap",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bar" => Ok(ChartType::Bar),
            "line" => Ok(ChartType::Line),
            "pie" => Ok(ChartType::Pie),
            "scatter" => Ok(ChartType::Scatter),
            "radar" => Ok(ChartType::Radar),
            "heatmap" => Ok(ChartType::Heatmap),
            other => Err(AdvisorError::UnknownChartType(other.to_string())),
        }
    }
}

/// Declared or inferred kind of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
    Temporal,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }
    pub fn is_categorical(&self) -> bool {
        matches!(self, ColumnType::Categorical)
    }
    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Temporal)
    }
}

/// Failures of the external inference path. None of these reach callers of
/// the advisor; they select the heuristic fallback instead.
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("AI-assisted mode is disabled")]
    Disabled,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Inference endpoint returned status {0}")]
    Status(u16),

    #[error("Timeout error")]
    Timeout,

    #[error("Malformed advisor payload: {0}")]
    Malformed(String),

    #[error("Unknown chart type: {0}")]
    UnknownChartType(String),
}

pub type AdvisorResult<T> = Result<T, AdvisorError>;
