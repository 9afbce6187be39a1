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

use crate::types::ChartType;
use serde::{Deserialize, Serialize};

/// A secondary chart suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub chart_type: ChartType,
    pub confidence: f64,
    pub reason: String,
}

/// Chart choice for a dataset: the primary type, its confidence in
/// `[0, 1]`, a human-readable reason and at most two alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub primary_type: ChartType,
    pub confidence: f64,
    pub reason: String,
    pub alternatives: Vec<Alternative>,
}

impl Recommendation {
    /// Alternatives beyond this count are dropped.
    pub const MAX_ALTERNATIVES: usize = 2;

    pub fn new(primary_type: ChartType, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            primary_type,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternatives(mut self, alternatives: Vec<Alternative>) -> Self {
        self.alternatives = alternatives
            .into_iter()
            .filter(|alt| alt.chart_type != self.primary_type)
            .take(Self::MAX_ALTERNATIVES)
            .collect();
        self
    }

    /// Alternative chart types in ranked order.
    pub fn alternative_types(&self) -> Vec<ChartType> {
        self.alternatives.iter().map(|alt| alt.chart_type).collect()
    }
}

/// Payload returned by an inference endpoint. Every field is optional on the
/// wire; the advisor fills gaps with defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorResponse {
    #[serde(default)]
    pub primary_type: Option<String>,
    #[serde(default)]
    pub primary_confidence: Option<f64>,
    #[serde(default)]
    pub primary_reason: Option<String>,
    #[serde(default)]
    pub alternatives: Option<Vec<AdvisorAlternative>>,
}

/// Alternative entry as the inference service reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorAlternative {
    #[serde(rename = "type")]
    pub chart_type: String,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}
