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

//! Two-phase entrance effects.
//!
//! A surface cannot animate from an implicit prior state, so the "from"
//! state is rendered explicitly first: `prepare` applies a zero state with
//! animation off (`Prepared`), and once the entrance delay has elapsed on
//! the injected clock `poll` applies the real configuration with animation
//! on (`Animating`).

use crate::surface::{set_nested, RenderConfig, RenderSurface};
use serde_json::{json, Map, Value};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Time source for staged entrance transitions.
pub trait Clock: Send + Sync {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Clock advanced by hand, for driving transitions without timers.
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(PoisonError::into_inner);
        *elapsed += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.elapsed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clock backed by the Tokio timer, so it follows a paused test runtime.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Side of the container a slide-in starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// How a chart first appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntranceEffect {
    ZoomIn,
    FadeIn,
    SlideIn(Edge),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrancePhase {
    Pending,
    Prepared,
    Animating,
}

/// Two-step entrance: apply the zero state, then the target once the
/// delay has elapsed.
#[derive(Debug, Clone)]
pub struct EntranceTransition {
    effect: EntranceEffect,
    target: RenderConfig,
    delay: Duration,
    prepared_at: Option<Duration>,
    phase: EntrancePhase,
}

impl EntranceTransition {
    pub fn new(effect: EntranceEffect, target: RenderConfig, delay: Duration) -> Self {
        Self {
            effect,
            target,
            delay,
            prepared_at: None,
            phase: EntrancePhase::Pending,
        }
    }

    pub fn phase(&self) -> EntrancePhase {
        self.phase
    }

    pub fn effect(&self) -> EntranceEffect {
        self.effect
    }

    /// Phase one: replace the surface's configuration with the zero state.
    pub fn prepare(&mut self, surface: &dyn RenderSurface, now: Duration) {
        let zero = self.zero_state(surface.container_size());
        surface.set_option(&zero, true);
        self.prepared_at = Some(now);
        self.phase = EntrancePhase::Prepared;
        debug!(effect = ?self.effect, "Entrance zero state applied");
    }

    /// Phase two, once the delay has elapsed since `prepare`. Returns the
    /// phase after the call.
    pub fn poll(&mut self, surface: &dyn RenderSurface, now: Duration) -> EntrancePhase {
        if self.phase != EntrancePhase::Prepared {
            return self.phase;
        }
        let ready = self
            .prepared_at
            .is_some_and(|at| now.saturating_sub(at) >= self.delay);
        if ready {
            surface.set_option(&self.final_state(), false);
            self.phase = EntrancePhase::Animating;
            debug!(effect = ?self.effect, "Entrance animation started");
        }
        self.phase
    }

    pub fn poll_clock(&mut self, surface: &dyn RenderSurface, clock: &dyn Clock) -> EntrancePhase {
        self.poll(surface, clock.now())
    }

    /// Target configuration at zero size, zero opacity or translated off
    /// screen, with animation disabled.
    pub fn zero_state(&self, container: (f64, f64)) -> RenderConfig {
        let mut config = object_of(&self.target);
        config.insert("animation".into(), json!(false));
        match self.effect {
            EntranceEffect::ZoomIn => for_each_series(&mut config, |series| {
                if series_type(series) == Some("pie") {
                    series.insert("radius".into(), json!(["0%", "0%"]));
                } else if series_type(series) == Some("bar") {
                    series.insert("barWidth".into(), json!(0));
                } else {
                    series.insert("symbolSize".into(), json!(0));
                }
            }),
            EntranceEffect::FadeIn => for_each_series(&mut config, |series| {
                for style in ["itemStyle", "lineStyle", "areaStyle"] {
                    set_nested(series, style, "opacity", json!(0));
                }
            }),
            EntranceEffect::SlideIn(edge) => {
                let (width, height) = container;
                let grid = match edge {
                    Edge::Left => json!({ "left": -width, "right": width }),
                    Edge::Right => json!({ "left": width, "right": -width }),
                    Edge::Top => json!({ "top": -height, "bottom": height }),
                    Edge::Bottom => json!({ "top": height, "bottom": -height }),
                };
                merge_grid(&mut config, grid);
            }
        }
        Value::Object(config)
    }

    /// Target configuration with animation enabled and every property the
    /// zero state touched set back explicitly, so a merge animates it.
    pub fn final_state(&self) -> RenderConfig {
        let mut config = object_of(&self.target);
        config.insert("animation".into(), json!(true));
        match self.effect {
            EntranceEffect::ZoomIn => for_each_series(&mut config, |series| {
                if series_type(series) == Some("pie") {
                    series
                        .entry("radius".to_string())
                        .or_insert_with(|| json!("75%"));
                } else if series_type(series) == Some("bar") {
                    series
                        .entry("barWidth".to_string())
                        .or_insert(Value::Null);
                } else {
                    series
                        .entry("symbolSize".to_string())
                        .or_insert_with(|| json!(4));
                }
            }),
            EntranceEffect::FadeIn => for_each_series(&mut config, |series| {
                for style in ["itemStyle", "lineStyle", "areaStyle"] {
                    let section = series
                        .entry(style.to_string())
                        .or_insert_with(|| Value::Object(Map::new()));
                    if let Value::Object(inner) = section {
                        inner.entry("opacity".to_string()).or_insert(json!(1));
                    }
                }
            }),
            EntranceEffect::SlideIn(edge) => {
                let grid = match edge {
                    Edge::Left | Edge::Right => json!({ "left": "10%", "right": "10%" }),
                    Edge::Top | Edge::Bottom => json!({ "top": 60, "bottom": 60 }),
                };
                let keep_target = config.get("grid").cloned();
                merge_grid(&mut config, grid);
                if let Some(Value::Object(original)) = keep_target {
                    merge_grid(&mut config, Value::Object(original));
                }
            }
        }
        Value::Object(config)
    }
}

fn object_of(config: &RenderConfig) -> Map<String, Value> {
    match config {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

fn series_type(series: &Map<String, Value>) -> Option<&str> {
    series.get("type").and_then(Value::as_str)
}

fn for_each_series<F>(config: &mut Map<String, Value>, mut f: F)
where
    F: FnMut(&mut Map<String, Value>),
{
    match config.get_mut("series") {
        Some(Value::Array(items)) => {
            for item in items.iter_mut() {
                if let Value::Object(series) = item {
                    f(series);
                }
            }
        }
        Some(Value::Object(series)) => f(series),
        _ => {}
    }
}

fn merge_grid(config: &mut Map<String, Value>, overrides: Value) {
    let Value::Object(overrides) = overrides else {
        return;
    };
    let grid = config
        .entry("grid".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !grid.is_object() {
        *grid = Value::Object(Map::new());
    }
    if let Value::Object(grid) = grid {
        grid.extend(overrides);
    }
}
