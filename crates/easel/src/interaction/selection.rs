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

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Identifies one selected data point.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionKey {
    pub series_id: String,
    pub row_index: usize,
}

impl SelectionKey {
    pub fn new(series_id: impl Into<String>, row_index: usize) -> Self {
        Self {
            series_id: series_id.into(),
            row_index,
        }
    }
}

/// Selected data points of one instance, in selection order. Unbounded.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    keys: IndexSet<SelectionKey>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership and reports whether the key is now selected.
    pub fn toggle(&mut self, key: SelectionKey) -> bool {
        if self.keys.shift_remove(&key) {
            false
        } else {
            self.keys.insert(key);
            true
        }
    }

    pub fn contains(&self, key: &SelectionKey) -> bool {
        self.keys.contains(key)
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn to_vec(&self) -> Vec<SelectionKey> {
        self.keys.iter().cloned().collect()
    }
}
