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

pub mod entrance;

pub use entrance::{
    Clock, Edge, EntranceEffect, EntrancePhase, EntranceTransition, ManualClock, TokioClock,
};

use crate::config::AnimationConfig;
use crate::surface::{RenderConfig, RenderSurface};
use rand::Rng;
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Named duration and easing combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationPreset {
    Smooth,
    Bounce,
    Elastic,
    Fade,
    Zoom,
    Slide,
}

impl AnimationPreset {
    pub const ALL: [AnimationPreset; 6] = [
        AnimationPreset::Smooth,
        AnimationPreset::Bounce,
        AnimationPreset::Elastic,
        AnimationPreset::Fade,
        AnimationPreset::Zoom,
        AnimationPreset::Slide,
    ];

    /// Duration in milliseconds.
    pub fn duration_ms(&self) -> u64 {
        match self {
            AnimationPreset::Smooth => 1000,
            AnimationPreset::Bounce => 1500,
            AnimationPreset::Elastic => 2000,
            AnimationPreset::Fade => 800,
            AnimationPreset::Zoom => 1200,
            AnimationPreset::Slide => 1000,
        }
    }

    pub fn easing(&self) -> &'static str {
        match self {
            AnimationPreset::Smooth => "cubicInOut",
            AnimationPreset::Bounce => "bounceOut",
            AnimationPreset::Elastic => "elasticOut",
            AnimationPreset::Fade => "linear",
            AnimationPreset::Zoom => "backOut",
            AnimationPreset::Slide => "quarticOut",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AnimationPreset::Smooth => "smooth",
            AnimationPreset::Bounce => "bounce",
            AnimationPreset::Elastic => "elastic",
            AnimationPreset::Fade => "fade",
            AnimationPreset::Zoom => "zoom",
            AnimationPreset::Slide => "slide",
        }
    }
}

impl fmt::Display for AnimationPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnimationPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnimationPreset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown animation preset '{s}'"))
    }
}

/// Per-element delay, evaluated by the rendering surface once per element.
pub type DelayFn = Arc<dyn Fn(usize) -> f64 + Send + Sync>;

/// Per-element stagger, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DelayStrategy {
    /// `idx * step`
    Progressive { step: f64 },
    /// `sin(idx * 0.5) * amplitude`
    Wave { amplitude: f64 },
    /// Uniform in `[0, max)`.
    Random { max: f64 },
    /// `floor(idx / group_size) * step`
    Grouped { group_size: usize, step: f64 },
}

impl DelayStrategy {
    pub fn delay_for(&self, idx: usize) -> f64 {
        match *self {
            DelayStrategy::Progressive { step } => idx as f64 * step,
            DelayStrategy::Wave { amplitude } => (idx as f64 * 0.5).sin() * amplitude,
            DelayStrategy::Random { max } => {
                if max.is_finite() && max > 0.0 {
                    rand::thread_rng().gen_range(0.0..max)
                } else {
                    0.0
                }
            }
            DelayStrategy::Grouped { group_size, step } => {
                (idx / group_size.max(1)) as f64 * step
            }
        }
    }

    pub fn into_fn(self) -> DelayFn {
        Arc::new(move |idx| self.delay_for(idx))
    }
}

/// Applies animation presets and builds entrance transitions.
#[derive(Debug, Clone)]
pub struct TransitionAnimator {
    default_preset: AnimationPreset,
    entrance_delay: Duration,
}

impl Default for TransitionAnimator {
    fn default() -> Self {
        Self::with_config(&AnimationConfig::default())
    }
}

impl TransitionAnimator {
    pub fn new(default_preset: AnimationPreset, entrance_delay: Duration) -> Self {
        Self {
            default_preset,
            entrance_delay,
        }
    }

    /// Unknown preset names in the configuration fall back to `smooth`.
    pub fn with_config(config: &AnimationConfig) -> Self {
        Self::new(
            config
                .default_preset
                .parse()
                .unwrap_or(AnimationPreset::Smooth),
            config.entrance_delay(),
        )
    }

    pub fn default_preset(&self) -> AnimationPreset {
        self.default_preset
    }

    pub fn entrance_delay(&self) -> Duration {
        self.entrance_delay
    }

    /// Sets the same duration and easing on entrance and update animation.
    pub fn apply_preset(&self, config: &RenderConfig, preset: AnimationPreset) -> RenderConfig {
        let mut map = match config {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        map.insert("animation".into(), json!(true));
        map.insert("animationDuration".into(), json!(preset.duration_ms()));
        map.insert("animationEasing".into(), json!(preset.easing()));
        map.insert(
            "animationDurationUpdate".into(),
            json!(preset.duration_ms()),
        );
        map.insert("animationEasingUpdate".into(), json!(preset.easing()));
        debug!(preset = %preset, "Applied animation preset");
        Value::Object(map)
    }

    pub fn apply_default_preset(&self, config: &RenderConfig) -> RenderConfig {
        self.apply_preset(config, self.default_preset)
    }

    pub fn delay_fn(&self, strategy: DelayStrategy) -> DelayFn {
        strategy.into_fn()
    }

    pub fn entrance(&self, effect: EntranceEffect, target: RenderConfig) -> EntranceTransition {
        EntranceTransition::new(effect, target, self.entrance_delay)
    }

    /// Runs both entrance phases against a live surface, sleeping on the
    /// runtime clock in between.
    pub async fn play_entrance(
        &self,
        surface: &dyn RenderSurface,
        effect: EntranceEffect,
        target: RenderConfig,
    ) -> EntranceTransition {
        let clock = TokioClock::new();
        let mut transition = self.entrance(effect, target);
        transition.prepare(surface, clock.now());
        tokio::time::sleep(self.entrance_delay).await;
        transition.poll(surface, clock.now());
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing_ignores_case() {
        assert_eq!(
            " Bounce ".parse::<AnimationPreset>().unwrap(),
            AnimationPreset::Bounce
        );
        assert!("wobble".parse::<AnimationPreset>().is_err());
    }

    #[test]
    fn test_grouped_delay() {
        let strategy = DelayStrategy::Grouped {
            group_size: 3,
            step: 100.0,
        };
        let delays: Vec<f64> = (0..7).map(|i| strategy.delay_for(i)).collect();
        assert_eq!(delays, vec![0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 200.0]);
    }
}
