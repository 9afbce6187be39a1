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

//! Adaptive visualization engine: chart-type recommendation, progressive
//! delivery of large row-sets, cross-chart interaction and entrance
//! animation for an external rendering surface.

pub mod advisor;
pub mod animation;
pub mod chart_selector;
pub mod config;
pub mod dataset;
pub mod error;
pub mod feature_analyzer;
pub mod interaction;
pub mod optimizer;
pub mod streaming;
pub mod surface;

pub use advisor::{AdvisorOptions, ChartAdvisor, HttpInferenceBackend, InferenceBackend};
pub use animation::{AnimationPreset, DelayStrategy, EntranceEffect, TransitionAnimator};
pub use chart_selector::ChartTypeSelector;
pub use config::EngineConfig;
pub use dataset::{Dataset, Row};
pub use easel_contracts::{ChartType, ColumnType, FeatureProfile, Recommendation};
pub use error::{ConfigError, EaselError, Result, ValidationError};
pub use feature_analyzer::{ColumnClassification, ColumnKind, FeatureAnalyzer};
pub use interaction::{InstanceId, InteractionCoordinator};
pub use optimizer::LargeDatasetOptimizer;
pub use streaming::{RenderBatch, RenderSession, SessionOutcome, StreamRenderCoordinator};
pub use surface::{RenderConfig, RenderSurface, SurfaceAction, SurfaceEvent};

use std::sync::Arc;
use tracing::info;

/// Owns one instance of every engine service. The host creates it once,
/// passes it where needed, and calls [`Easel::shutdown`] on teardown.
pub struct Easel {
    config: EngineConfig,
    advisor: ChartAdvisor,
    streaming: StreamRenderCoordinator,
    optimizer: LargeDatasetOptimizer,
    interaction: InteractionCoordinator,
    animator: TransitionAnimator,
}

impl Easel {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let advisor = ChartAdvisor::from_config(&config.advisor);
        Ok(Self::assemble(config, advisor))
    }

    /// Uses a caller-supplied inference backend instead of the HTTP one.
    /// `advisor.endpoint` is not required here; the backend decides where
    /// requests go.
    pub fn with_backend(config: EngineConfig, backend: Arc<dyn InferenceBackend>) -> Result<Self> {
        config.validate_values()?;
        let advisor = ChartAdvisor::with_backend(backend, &config.advisor);
        Ok(Self::assemble(config, advisor))
    }

    fn assemble(config: EngineConfig, advisor: ChartAdvisor) -> Self {
        info!(
            ai_enabled = advisor.is_ai_enabled(),
            batch_size = config.streaming.batch_size,
            large_data_threshold = config.optimizer.large_data_threshold,
            "Creating easel engine"
        );
        Self {
            streaming: StreamRenderCoordinator::with_config(&config.streaming),
            optimizer: LargeDatasetOptimizer::with_config(config.optimizer.clone()),
            interaction: InteractionCoordinator::new(),
            animator: TransitionAnimator::with_config(&config.animation),
            advisor,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn advisor(&self) -> &ChartAdvisor {
        &self.advisor
    }

    pub fn streaming(&self) -> &StreamRenderCoordinator {
        &self.streaming
    }

    pub fn optimizer(&self) -> &LargeDatasetOptimizer {
        &self.optimizer
    }

    pub fn interaction(&self) -> &InteractionCoordinator {
        &self.interaction
    }

    pub fn animator(&self) -> &TransitionAnimator {
        &self.animator
    }

    /// Cancels every streaming session and forgets all interaction state.
    pub fn shutdown(&self) {
        info!("Shutting down easel engine");
        self.streaming.cleanup();
        self.interaction.clear();
    }
}
