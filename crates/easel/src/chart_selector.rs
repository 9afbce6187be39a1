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

use crate::dataset::Dataset;
use crate::feature_analyzer::FeatureAnalyzer;
use easel_contracts::{ChartType, FeatureProfile};

const PIE_MAX_ROWS: usize = 10;

/// Rule engine mapping a feature profile to a chart type. Total: every
/// profile, including the all-zero one, yields a type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartTypeSelector {
    analyzer: FeatureAnalyzer,
}

impl ChartTypeSelector {
    pub fn new() -> Self {
        Self {
            analyzer: FeatureAnalyzer::new(),
        }
    }

    pub fn select(&self, profile: &FeatureProfile) -> ChartType {
        self.recommend(profile).0
    }

    /// First matching rule wins.
    pub fn recommend(&self, profile: &FeatureProfile) -> (ChartType, String) {
        let numeric = profile.numeric_column_count;
        let categorical = profile.categorical_column_count;

        if profile.has_time_series {
            return (
                ChartType::Line,
                "Temporal column with numeric measures suggests a trend over time".to_string(),
            );
        }
        if categorical == 1 && numeric == 1 {
            return if profile.row_count <= PIE_MAX_ROWS {
                (
                    ChartType::Pie,
                    format!(
                        "One category with one measure across {} rows reads well as proportions",
                        profile.row_count
                    ),
                )
            } else {
                (
                    ChartType::Bar,
                    format!(
                        "One category with one measure across {} rows is too many slices for a pie",
                        profile.row_count
                    ),
                )
            };
        }
        if numeric >= 2 && categorical == 0 {
            return (
                ChartType::Scatter,
                "Multiple numeric columns without categories suggest a correlation view"
                    .to_string(),
            );
        }
        if numeric >= 3 && categorical == 1 {
            return (
                ChartType::Radar,
                "Several measures per category suit a multi-axis comparison".to_string(),
            );
        }
        if categorical >= 2 && numeric >= 1 {
            return (
                ChartType::Heatmap,
                "Two categorical dimensions with a measure form a matrix".to_string(),
            );
        }
        (
            ChartType::Bar,
            "No specialised pattern detected; bar chart is the general default".to_string(),
        )
    }

    pub fn get_available_types(&self, dataset: &Dataset) -> Vec<ChartType> {
        self.available_types(&self.analyzer.analyze(dataset))
    }

    /// Every structurally valid type for the profile, in a stable order.
    /// `bar` is always present.
    pub fn available_types(&self, profile: &FeatureProfile) -> Vec<ChartType> {
        let numeric = profile.numeric_column_count;
        let categorical = profile.categorical_column_count;
        let mut types = Vec::with_capacity(ChartType::ALL.len());

        if categorical >= 1 && numeric >= 1 {
            types.push(ChartType::Bar);
            types.push(ChartType::Line);
        }
        if profile.has_time_series && !types.contains(&ChartType::Line) {
            types.push(ChartType::Line);
        }
        if categorical == 1 && numeric == 1 {
            types.push(ChartType::Pie);
        }
        if numeric >= 2 {
            types.push(ChartType::Scatter);
        }
        if numeric >= 3 && categorical == 1 {
            types.push(ChartType::Radar);
        }
        if categorical >= 2 && numeric >= 1 {
            types.push(ChartType::Heatmap);
        }
        if !types.contains(&ChartType::Bar) {
            types.insert(0, ChartType::Bar);
        }
        types
    }
}
