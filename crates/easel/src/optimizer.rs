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

use crate::config::OptimizerConfig;
use crate::surface::{set_nested, RenderConfig};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Strips costly visual effects from render configurations of large
/// datasets and downsamples rows uniformly.
#[derive(Debug, Clone)]
pub struct LargeDatasetOptimizer {
    config: OptimizerConfig,
}

impl Default for LargeDatasetOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LargeDatasetOptimizer {
    pub fn new() -> Self {
        Self::with_config(OptimizerConfig::default())
    }

    pub fn with_config(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn is_large_dataset(&self, row_count: usize) -> bool {
        row_count > self.config.large_data_threshold
    }

    /// Returns the configuration unchanged for small datasets. Large ones get
    /// animation off, progressive chunking on, large mode, and per-series
    /// label, stroke and marker simplification.
    pub fn optimize_render_config(&self, config: &RenderConfig, row_count: usize) -> RenderConfig {
        if !self.is_large_dataset(row_count) {
            return config.clone();
        }
        debug!(
            row_count,
            threshold = self.config.large_data_threshold,
            "Optimising render configuration for large dataset"
        );

        let mut optimised = match config {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        optimised.insert("animation".into(), json!(false));
        optimised.insert("animationDuration".into(), json!(0));
        optimised.insert("animationDurationUpdate".into(), json!(0));
        optimised.insert(
            "progressive".into(),
            json!(self.config.progressive_chunk_size),
        );
        optimised.insert(
            "progressiveThreshold".into(),
            json!(self.config.progressive_threshold),
        );

        if let Some(series) = optimised.get_mut("series") {
            match series {
                Value::Array(items) => {
                    for item in items.iter_mut() {
                        self.simplify_series(item);
                    }
                }
                Value::Object(_) => self.simplify_series(series),
                _ => {}
            }
        }
        Value::Object(optimised)
    }

    fn simplify_series(&self, series: &mut Value) {
        let Value::Object(map) = series else {
            return;
        };
        map.insert("large".into(), json!(true));
        map.insert(
            "largeThreshold".into(),
            json!(self.config.large_mode_threshold),
        );
        map.insert(
            "progressive".into(),
            json!(self.config.progressive_chunk_size),
        );
        map.insert(
            "progressiveThreshold".into(),
            json!(self.config.progressive_threshold),
        );
        set_nested(map, "label", "show", json!(false));
        set_nested(map, "lineStyle", "width", json!(1));
        map.insert("symbol".into(), json!("none"));
        map.insert("showSymbol".into(), json!(false));
    }

    pub fn sample_data<T: Clone>(&self, rows: &[T], target_size: usize) -> Vec<T> {
        sample_data(rows, target_size)
    }

    /// Size a large row-set should be sampled down to; identity otherwise.
    pub fn recommended_sample_size(&self, row_count: usize) -> usize {
        if self.is_large_dataset(row_count) {
            self.config.large_data_threshold
        } else {
            row_count
        }
    }
}

/// Picks `target_size` evenly spaced rows at `floor(i * len / target_size)`,
/// preserving order. Identity when the input already fits.
pub fn sample_data<T: Clone>(rows: &[T], target_size: usize) -> Vec<T> {
    if rows.len() <= target_size {
        return rows.to_vec();
    }
    let len = rows.len() as u128;
    let target = target_size as u128;
    (0..target)
        .map(|i| rows[(i * len / target) as usize].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_indices_are_uniform() {
        let rows: Vec<usize> = (0..10).collect();
        assert_eq!(sample_data(&rows, 5), vec![0, 2, 4, 6, 8]);
        assert_eq!(sample_data(&rows, 3), vec![0, 3, 6]);
        assert!(sample_data(&rows, 0).is_empty());
    }
}
