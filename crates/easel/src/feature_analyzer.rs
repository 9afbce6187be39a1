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
use easel_contracts::{ColumnType, FeatureProfile};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// YYYY-MM-DD, YYYY/MM/DD, DD-MM-YYYY, DD/MM/YYYY. Anchored at the start only
// so values carrying a time component still classify as temporal.
static TEMPORAL_PATTERNS: Lazy<[Regex; 4]> = Lazy::new(|| {
    [
        Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date pattern"),
        Regex::new(r"^\d{4}/\d{2}/\d{2}").expect("valid date pattern"),
        Regex::new(r"^\d{2}-\d{2}-\d{4}").expect("valid date pattern"),
        Regex::new(r"^\d{2}/\d{2}/\d{4}").expect("valid date pattern"),
    ]
});

/// How a column's class was established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Taken from the dataset's `columnTypes` metadata.
    Declared(ColumnType),
    /// Guessed from the first row's value.
    Inferred(ColumnType),
}

impl ColumnKind {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnKind::Declared(t) | ColumnKind::Inferred(t) => *t,
        }
    }

    pub fn is_declared(&self) -> bool {
        matches!(self, ColumnKind::Declared(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub name: String,
    pub kind: ColumnKind,
}

/// Derives a [`FeatureProfile`] from a dataset, classifying each column
/// by its declared type or by its first row.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAnalyzer;

impl FeatureAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, dataset: &Dataset) -> FeatureProfile {
        if dataset.is_empty() {
            return FeatureProfile::default();
        }
        let (mut numeric, mut categorical, mut temporal) = (0, 0, 0);
        for classification in self.classify_columns(dataset) {
            match classification.kind.column_type() {
                ColumnType::Numeric => numeric += 1,
                ColumnType::Categorical => categorical += 1,
                ColumnType::Temporal => temporal += 1,
            }
        }
        FeatureProfile::new(numeric, categorical, temporal, dataset.row_count())
    }

    /// Declared metadata wins; otherwise each column is inferred from the
    /// first row. Columns of an empty dataset without metadata are reported
    /// as inferred categorical.
    pub fn classify_columns(&self, dataset: &Dataset) -> Vec<ColumnClassification> {
        if let Some(types) = dataset.column_types() {
            return dataset
                .columns()
                .iter()
                .zip(types)
                .map(|(name, t)| ColumnClassification {
                    name: name.clone(),
                    kind: ColumnKind::Declared(*t),
                })
                .collect();
        }
        let first_row = dataset.rows().first();
        dataset
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let inferred = first_row
                    .and_then(|row| row.get(idx))
                    .map_or(ColumnType::Categorical, infer_value_type);
                ColumnClassification {
                    name: name.clone(),
                    kind: ColumnKind::Inferred(inferred),
                }
            })
            .collect()
    }
}

pub fn infer_value_type(value: &Value) -> ColumnType {
    match value {
        Value::Number(_) => ColumnType::Numeric,
        Value::String(s) if is_temporal_str(s) => ColumnType::Temporal,
        Value::String(s) if is_numeric_str(s) => ColumnType::Numeric,
        _ => ColumnType::Categorical,
    }
}

pub fn is_temporal_str(s: &str) -> bool {
    let s = s.trim();
    TEMPORAL_PATTERNS.iter().any(|re| re.is_match(s))
}

fn is_numeric_str(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.parse::<f64>().is_ok_and(f64::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_temporal_patterns() {
        assert!(is_temporal_str("2024-01-01"));
        assert!(is_temporal_str("2024/01/01"));
        assert!(is_temporal_str("01-02-2024"));
        assert!(is_temporal_str("01/02/2024"));
        assert!(is_temporal_str("2024-01-01 12:30:00"));
        assert!(!is_temporal_str("Jan 1 2024"));
        assert!(!is_temporal_str("20240101"));
    }

    #[test]
    fn test_infer_value_type() {
        assert_eq!(infer_value_type(&json!(3.5)), ColumnType::Numeric);
        assert_eq!(infer_value_type(&json!("42")), ColumnType::Numeric);
        assert_eq!(infer_value_type(&json!("2024-03-01")), ColumnType::Temporal);
        assert_eq!(infer_value_type(&json!("north")), ColumnType::Categorical);
        assert_eq!(infer_value_type(&json!(null)), ColumnType::Categorical);
        assert_eq!(infer_value_type(&json!("NaN")), ColumnType::Categorical);
    }
}
