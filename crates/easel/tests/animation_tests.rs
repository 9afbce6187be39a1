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

mod common;

use common::RecordingSurface;
use easel::animation::{Clock, Edge, EntrancePhase, ManualClock};
use easel::config::AnimationConfig;
use easel::surface::RenderSurface;
use easel::{AnimationPreset, DelayStrategy, EntranceEffect, TransitionAnimator};
use serde_json::json;
use std::time::Duration;

fn mixed_series() -> serde_json::Value {
    json!({
        "title": { "text": "Mix" },
        "series": [
            { "type": "pie", "data": [1, 2] },
            { "type": "bar", "data": [3, 4] },
            { "type": "line", "data": [5, 6], "symbolSize": 8 }
        ]
    })
}

#[test]
fn test_entrance_runs_both_phases_on_manual_clock() {
    let animator = TransitionAnimator::new(AnimationPreset::Smooth, Duration::from_millis(100));
    let surface = RecordingSurface::new("chart");
    let clock = ManualClock::new();

    let mut transition = animator.entrance(EntranceEffect::ZoomIn, mixed_series());
    assert_eq!(transition.phase(), EntrancePhase::Pending);
    assert_eq!(transition.poll_clock(&*surface, &clock), EntrancePhase::Pending);
    assert!(surface.set_calls().is_empty());

    transition.prepare(&*surface, clock.now());
    assert_eq!(transition.phase(), EntrancePhase::Prepared);
    let (zero, replace) = surface.set_calls()[0].clone();
    assert!(replace);
    assert_eq!(zero["animation"], false);
    assert_eq!(zero["series"][0]["radius"], json!(["0%", "0%"]));
    assert_eq!(zero["series"][1]["barWidth"], 0);
    assert_eq!(zero["series"][2]["symbolSize"], 0);

    clock.advance(Duration::from_millis(99));
    assert_eq!(transition.poll_clock(&*surface, &clock), EntrancePhase::Prepared);
    assert_eq!(surface.set_calls().len(), 1);

    clock.advance(Duration::from_millis(1));
    assert_eq!(transition.poll_clock(&*surface, &clock), EntrancePhase::Animating);
    let (target, replace) = surface.set_calls()[1].clone();
    assert!(!replace);
    assert_eq!(target["animation"], true);
    assert_eq!(target["series"][0]["radius"], "75%");
    assert!(target["series"][1]["barWidth"].is_null());
    assert_eq!(target["series"][2]["symbolSize"], 8);
    assert_eq!(target["title"]["text"], "Mix");

    clock.advance(Duration::from_secs(1));
    assert_eq!(transition.poll_clock(&*surface, &clock), EntrancePhase::Animating);
    assert_eq!(surface.set_calls().len(), 2);
}

#[test]
fn test_fade_in_zeroes_and_restores_opacity() {
    let animator = TransitionAnimator::default();
    let transition = animator.entrance(
        EntranceEffect::FadeIn,
        json!({ "series": { "type": "line", "itemStyle": { "color": "red", "opacity": 0.6 } } }),
    );
    let zero = transition.zero_state((800.0, 600.0));
    for style in ["itemStyle", "lineStyle", "areaStyle"] {
        assert_eq!(zero["series"][style]["opacity"], 0);
    }
    assert_eq!(zero["series"]["itemStyle"]["color"], "red");

    let target = transition.final_state();
    assert_eq!(target["series"]["itemStyle"]["opacity"], 0.6);
    assert_eq!(target["series"]["lineStyle"]["opacity"], 1);
    assert_eq!(target["series"]["areaStyle"]["opacity"], 1);
}

#[test]
fn test_slide_in_offsets_grid_by_container() {
    let animator = TransitionAnimator::default();
    let surface = RecordingSurface::new("chart");
    let (width, height) = surface.container_size();

    let left = animator.entrance(EntranceEffect::SlideIn(Edge::Left), json!({}));
    let zero = left.zero_state((width, height));
    assert_eq!(zero["grid"]["left"], -width);
    assert_eq!(zero["grid"]["right"], width);
    assert_eq!(left.final_state()["grid"]["left"], "10%");

    let bottom = animator.entrance(
        EntranceEffect::SlideIn(Edge::Bottom),
        json!({ "grid": { "top": 30 } }),
    );
    let zero = bottom.zero_state((width, height));
    assert_eq!(zero["grid"]["top"], height);
    assert_eq!(zero["grid"]["bottom"], -height);
    let target = bottom.final_state();
    assert_eq!(target["grid"]["top"], 30);
    assert_eq!(target["grid"]["bottom"], 60);
}

#[tokio::test(start_paused = true)]
async fn test_play_entrance_waits_for_delay() {
    let animator = TransitionAnimator::new(AnimationPreset::Fade, Duration::from_millis(250));
    let surface = RecordingSurface::new("chart");
    let started = tokio::time::Instant::now();

    let transition = animator
        .play_entrance(&*surface, EntranceEffect::ZoomIn, mixed_series())
        .await;

    assert_eq!(transition.phase(), EntrancePhase::Animating);
    assert!(started.elapsed() >= Duration::from_millis(250));
    let calls = surface.set_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].1);
    assert!(!calls[1].1);
    assert_eq!(surface.get_option()["animation"], true);
}

#[test]
fn test_apply_preset_sets_entrance_and_update_timing() {
    let animator = TransitionAnimator::default();
    let config = animator.apply_preset(&json!({ "series": [] }), AnimationPreset::Bounce);
    assert_eq!(config["animation"], true);
    assert_eq!(config["animationDuration"], 1500);
    assert_eq!(config["animationDurationUpdate"], 1500);
    assert_eq!(config["animationEasing"], "bounceOut");
    assert_eq!(config["animationEasingUpdate"], "bounceOut");
    assert!(config["series"].is_array());
}

#[test]
fn test_default_preset_from_config() {
    let animator = TransitionAnimator::with_config(&AnimationConfig {
        entrance_delay_ms: 40,
        default_preset: "ELASTIC".into(),
    });
    assert_eq!(animator.default_preset(), AnimationPreset::Elastic);
    assert_eq!(animator.entrance_delay(), Duration::from_millis(40));
    let config = animator.apply_default_preset(&json!({}));
    assert_eq!(config["animationDuration"], 2000);
    assert_eq!(config["animationEasing"], "elasticOut");

    let fallback = TransitionAnimator::with_config(&AnimationConfig {
        entrance_delay_ms: 100,
        default_preset: "wobble".into(),
    });
    assert_eq!(fallback.default_preset(), AnimationPreset::Smooth);
}

#[test]
fn test_delay_strategies() {
    let animator = TransitionAnimator::default();

    let progressive = animator.delay_fn(DelayStrategy::Progressive { step: 50.0 });
    assert_eq!(progressive(0), 0.0);
    assert_eq!(progressive(4), 200.0);

    let wave = animator.delay_fn(DelayStrategy::Wave { amplitude: 100.0 });
    assert!((wave(3) - (1.5f64).sin() * 100.0).abs() < 1e-9);

    let random = animator.delay_fn(DelayStrategy::Random { max: 300.0 });
    for idx in 0..200 {
        let delay = random(idx);
        assert!((0.0..300.0).contains(&delay));
    }
    let none = DelayStrategy::Random { max: 0.0 };
    assert_eq!(none.delay_for(9), 0.0);
}

#[test]
fn test_random_delay_with_unbounded_max_is_zero() {
    for max in [f64::INFINITY, f64::NAN, -5.0] {
        assert_eq!(DelayStrategy::Random { max }.delay_for(3), 0.0);
    }
}
