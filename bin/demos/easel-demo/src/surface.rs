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

use easel::surface::{RenderConfig, RenderSurface, ScreenPoint};
use easel::SurfaceAction;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// Stand-in for a real chart canvas: keeps the last configuration and logs
/// every call it receives.
#[derive(Debug)]
pub struct LoggingSurface {
    name: String,
    option: Mutex<Value>,
    actions: AtomicUsize,
}

impl LoggingSurface {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            option: Mutex::new(json!({})),
            actions: AtomicUsize::new(0),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn action_count(&self) -> usize {
        self.actions.load(Ordering::Relaxed)
    }

    pub fn render_rows(&self, batch: usize, total: usize) {
        info!(surface = %self.name, batch, total, "Rendering rows");
    }
}

impl RenderSurface for LoggingSurface {
    fn set_option(&self, config: &RenderConfig, replace: bool) {
        info!(
            surface = %self.name,
            replace,
            animation = %config["animation"],
            "set_option"
        );
        let mut current = self.option.lock().unwrap_or_else(PoisonError::into_inner);
        if !replace {
            if let (Value::Object(existing), Value::Object(update)) = (&mut *current, config) {
                existing.extend(update.clone());
                return;
            }
        }
        *current = config.clone();
    }

    fn dispatch_action(&self, action: &SurfaceAction) {
        self.actions.fetch_add(1, Ordering::Relaxed);
        info!(surface = %self.name, kind = action.kind(), "dispatch_action");
    }

    fn get_option(&self) -> RenderConfig {
        self.option
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn convert_from_pixel(&self, position: ScreenPoint) -> Option<Vec<f64>> {
        Some(vec![position.x / 20.0, 100.0 - position.y / 4.0])
    }

    fn container_size(&self) -> (f64, f64) {
        (1200.0, 800.0)
    }
}
