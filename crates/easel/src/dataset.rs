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

use crate::error::{ValidationError, ValidationResult};
use easel_contracts::ColumnType;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;

/// One positional row of JSON values.
pub type Row = Vec<Value>;

/// Tabular query result handed to the engine. Validated on construction and
/// immutable afterwards; clones share the row storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Arc<[Row]>,
    column_types: Option<Vec<ColumnType>>,
}

#[derive(Debug, Deserialize)]
struct RawDataset {
    columns: Vec<String>,
    rows: Vec<Row>,
    #[serde(default, rename = "columnTypes", alias = "column_types")]
    column_types: Option<Vec<ColumnType>>,
}

impl Dataset {
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Row>,
        column_types: Option<Vec<ColumnType>>,
    ) -> ValidationResult<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ValidationError::DuplicateColumn { name: name.clone() });
            }
        }
        if let Some(types) = &column_types {
            if types.len() != columns.len() {
                return Err(ValidationError::ColumnTypeLengthMismatch {
                    expected: columns.len(),
                    found: types.len(),
                });
            }
        }
        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
            .map(|(i, r)| (i, r.len()))
        {
            return Err(ValidationError::RowLengthMismatch {
                row,
                expected: columns.len(),
                found,
            });
        }
        Ok(Self {
            columns,
            rows: rows.into(),
            column_types,
        })
    }

    /// Parses the `{ columns, rows, columnTypes? }` shape produced by the
    /// data-source service.
    pub fn from_json(value: Value) -> ValidationResult<Self> {
        let raw: RawDataset =
            serde_json::from_value(value).map_err(|e| ValidationError::MalformedPayload {
                reason: e.to_string(),
            })?;
        Self::new(raw.columns, raw.rows, raw.column_types)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_types(&self) -> Option<&[ColumnType]> {
        self.column_types.as_deref()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn sample_rows(&self, n: usize) -> Vec<Row> {
        self.rows.iter().take(n).cloned().collect()
    }
}
