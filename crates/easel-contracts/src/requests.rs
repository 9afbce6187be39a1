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
use serde_json::Value;

/// Column-class summary of a dataset. Recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureProfile {
    pub numeric_column_count: usize,
    pub categorical_column_count: usize,
    pub temporal_column_count: usize,
    pub row_count: usize,
    pub has_time_series: bool,
}

impl FeatureProfile {
    pub fn new(numeric: usize, categorical: usize, temporal: usize, row_count: usize) -> Self {
        Self {
            numeric_column_count: numeric,
            categorical_column_count: categorical,
            temporal_column_count: temporal,
            row_count,
            has_time_series: temporal > 0 && numeric > 0,
        }
    }

    pub fn total_columns(&self) -> usize {
        self.numeric_column_count + self.categorical_column_count + self.temporal_column_count
    }
}

/// Payload sent to the inference service: dataset shape, a few sample
/// rows, and the optional question and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorRequest {
    pub feature_profile: FeatureProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_text: Option<String>,
    pub columns: Vec<String>,
    pub sample_rows: Vec<Vec<Value>>,
}
