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

#![allow(dead_code)]

use easel::surface::{RenderConfig, RenderSurface, ScreenPoint, SurfaceAction};
use easel::{ColumnType, Dataset};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// In-memory rendering surface that records every call made by the engine.
#[derive(Debug)]
pub struct RecordingSurface {
    pub name: String,
    option: Mutex<Value>,
    pub set_calls: Mutex<Vec<(Value, bool)>>,
    pub actions: Mutex<Vec<SurfaceAction>>,
}

impl RecordingSurface {
    pub fn new(name: &str) -> Arc<Self> {
        Self::with_option(name, json!({}))
    }

    pub fn with_option(name: &str, option: Value) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            option: Mutex::new(option),
            set_calls: Mutex::new(Vec::new()),
            actions: Mutex::new(Vec::new()),
        })
    }

    pub fn actions(&self) -> Vec<SurfaceAction> {
        self.actions.lock().unwrap().clone()
    }

    pub fn set_calls(&self) -> Vec<(Value, bool)> {
        self.set_calls.lock().unwrap().clone()
    }
}

impl RenderSurface for RecordingSurface {
    fn set_option(&self, config: &RenderConfig, replace: bool) {
        self.set_calls.lock().unwrap().push((config.clone(), replace));
        let mut current = self.option.lock().unwrap();
        if !replace {
            if let (Value::Object(existing), Value::Object(update)) = (&mut *current, config) {
                for (k, v) in update {
                    existing.insert(k.clone(), v.clone());
                }
                return;
            }
        }
        *current = config.clone();
    }

    fn dispatch_action(&self, action: &SurfaceAction) {
        self.actions.lock().unwrap().push(action.clone());
    }

    fn get_option(&self) -> RenderConfig {
        self.option.lock().unwrap().clone()
    }

    fn convert_from_pixel(&self, position: ScreenPoint) -> Option<Vec<f64>> {
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }
        Some(vec![position.x / 10.0, position.y / 10.0])
    }

    fn container_size(&self) -> (f64, f64) {
        (800.0, 600.0)
    }
}

pub fn rows_of(n: usize) -> Vec<Vec<Value>> {
    (0..n).map(|i| vec![json!(format!("r{i}")), json!(i)]).collect()
}

pub fn category_value_dataset(rows: usize) -> Dataset {
    Dataset::new(
        vec!["region".to_string(), "sales".to_string()],
        rows_of(rows),
        Some(vec![ColumnType::Categorical, ColumnType::Numeric]),
    )
    .unwrap()
}
