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

pub mod http;
pub mod intent;

pub use http::HttpInferenceBackend;
pub use intent::{detect_intent, IntentCategory, IntentMatch};

use crate::chart_selector::ChartTypeSelector;
use crate::config::AdvisorConfig;
use crate::dataset::Dataset;
use crate::feature_analyzer::FeatureAnalyzer;
use async_trait::async_trait;
use easel_contracts::{
    AdvisorError, AdvisorRequest, AdvisorResponse, AdvisorResult, Alternative, ChartType,
    FeatureProfile, Recommendation,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const HEURISTIC_CONFIDENCE: f64 = 0.85;
pub const HEURISTIC_ALTERNATIVE_CONFIDENCE: f64 = 0.7;
pub const DEFAULT_RESPONSE_CONFIDENCE: f64 = 0.8;
pub const MAX_SAMPLE_ROWS: usize = 5;

/// External chart-inference service.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn recommend(&self, request: &AdvisorRequest) -> AdvisorResult<AdvisorResponse>;

    fn name(&self) -> &str {
        "custom"
    }
}

/// Per-call overrides for a recommendation request.
#[derive(Debug, Clone, Default)]
pub struct AdvisorOptions {
    /// Upper bound on the inference round trip. Falls back to the configured
    /// timeout when unset.
    pub timeout: Option<Duration>,
    pub context_text: Option<String>,
}

impl AdvisorOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            context_text: None,
        }
    }
}

/// Recommends chart types through an optional inference backend, with
/// the rule-based selector as fallback.
pub struct ChartAdvisor {
    analyzer: FeatureAnalyzer,
    selector: ChartTypeSelector,
    backend: Option<Arc<dyn InferenceBackend>>,
    ai_enabled: bool,
    default_timeout: Duration,
    max_sample_rows: usize,
}

impl std::fmt::Debug for ChartAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartAdvisor")
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .field("ai_enabled", &self.ai_enabled)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

impl ChartAdvisor {
    /// Advisor that never calls out.
    pub fn heuristic_only() -> Self {
        let defaults = AdvisorConfig::default();
        Self {
            analyzer: FeatureAnalyzer::new(),
            selector: ChartTypeSelector::new(),
            backend: None,
            ai_enabled: false,
            default_timeout: defaults.timeout(),
            max_sample_rows: defaults.max_sample_rows,
        }
    }

    pub fn with_backend(backend: Arc<dyn InferenceBackend>, config: &AdvisorConfig) -> Self {
        Self {
            analyzer: FeatureAnalyzer::new(),
            selector: ChartTypeSelector::new(),
            backend: Some(backend),
            ai_enabled: config.enabled,
            default_timeout: config.timeout(),
            max_sample_rows: config.max_sample_rows.min(MAX_SAMPLE_ROWS),
        }
    }

    /// Builds an HTTP-backed advisor when AI mode is enabled with an endpoint,
    /// and a heuristic-only one otherwise.
    pub fn from_config(config: &AdvisorConfig) -> Self {
        match (&config.endpoint, config.enabled) {
            (Some(endpoint), true) => match HttpInferenceBackend::new(endpoint.clone()) {
                Ok(backend) => Self::with_backend(Arc::new(backend), config),
                Err(e) => {
                    warn!("Inference backend unavailable, using heuristics only: {e}");
                    Self::heuristic_only()
                }
            },
            _ => Self {
                default_timeout: config.timeout(),
                ..Self::heuristic_only()
            },
        }
    }

    pub fn set_ai_enabled(&mut self, enabled: bool) {
        self.ai_enabled = enabled;
    }

    pub fn is_ai_enabled(&self) -> bool {
        self.ai_enabled && self.backend.is_some()
    }

    pub fn selector(&self) -> &ChartTypeSelector {
        &self.selector
    }

    pub async fn select_chart_type(
        &self,
        dataset: &Dataset,
        user_question: Option<&str>,
    ) -> Recommendation {
        self.select_chart_type_with(dataset, user_question, &AdvisorOptions::default())
            .await
    }

    /// Never fails: inference errors resolve to the heuristic recommendation,
    /// and keyword intent in the question is applied last.
    pub async fn select_chart_type_with(
        &self,
        dataset: &Dataset,
        user_question: Option<&str>,
        options: &AdvisorOptions,
    ) -> Recommendation {
        let profile = self.analyzer.analyze(dataset);
        debug!(?profile, "Computed feature profile");

        let recommendation = if self.is_ai_enabled() {
            match self.query_backend(dataset, &profile, user_question, options).await {
                Ok(rec) => {
                    info!(chart_type = %rec.primary_type, "Using inference recommendation");
                    rec
                }
                Err(e) => {
                    warn!(error = %e, "Chart inference failed, falling back to heuristics");
                    self.heuristic_recommendation(&profile)
                }
            }
        } else {
            self.heuristic_recommendation(&profile)
        };

        match user_question {
            Some(question) => apply_intent_override(recommendation, question),
            None => recommendation,
        }
    }

    /// Rule-based recommendation; used whenever the backend is off or fails.
    pub fn heuristic_recommendation(&self, profile: &FeatureProfile) -> Recommendation {
        let (primary, reason) = self.selector.recommend(profile);
        let alternatives = self
            .selector
            .available_types(profile)
            .into_iter()
            .filter(|t| *t != primary)
            .map(|t| Alternative {
                chart_type: t,
                confidence: HEURISTIC_ALTERNATIVE_CONFIDENCE,
                reason: format!("{t} chart is also structurally valid for this data"),
            })
            .collect();
        Recommendation::new(primary, HEURISTIC_CONFIDENCE, reason).with_alternatives(alternatives)
    }

    async fn query_backend(
        &self,
        dataset: &Dataset,
        profile: &FeatureProfile,
        user_question: Option<&str>,
        options: &AdvisorOptions,
    ) -> AdvisorResult<Recommendation> {
        let backend = self.backend.as_ref().ok_or(AdvisorError::Disabled)?;
        let request = AdvisorRequest {
            feature_profile: *profile,
            user_question: user_question.map(str::to_string),
            context_text: options.context_text.clone(),
            columns: dataset.columns().to_vec(),
            sample_rows: dataset.sample_rows(self.max_sample_rows),
        };
        let timeout = options.timeout.unwrap_or(self.default_timeout);
        let response = tokio::time::timeout(timeout, backend.recommend(&request))
            .await
            .map_err(|_| AdvisorError::Timeout)??;
        map_response(response)
    }
}

/// Missing fields default to a bar chart at 0.8 confidence. An unknown
/// primary type is malformed.
pub fn map_response(response: AdvisorResponse) -> AdvisorResult<Recommendation> {
    let primary = match response.primary_type.as_deref() {
        Some(raw) => raw.parse::<ChartType>()?,
        None => ChartType::Bar,
    };
    let confidence = response
        .primary_confidence
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_RESPONSE_CONFIDENCE);
    let reason = response
        .primary_reason
        .unwrap_or_else(|| "Recommended by the inference service".to_string());
    let alternatives = response
        .alternatives
        .unwrap_or_default()
        .into_iter()
        .filter_map(|alt| match alt.chart_type.parse::<ChartType>() {
            Ok(chart_type) => Some(Alternative {
                chart_type,
                confidence: alt
                    .confidence
                    .filter(|c| c.is_finite())
                    .unwrap_or(DEFAULT_RESPONSE_CONFIDENCE)
                    .clamp(0.0, 1.0),
                reason: alt.reason.unwrap_or_default(),
            }),
            Err(e) => {
                debug!("Dropping alternative: {e}");
                None
            }
        })
        .collect();
    Ok(Recommendation::new(primary, confidence, reason).with_alternatives(alternatives))
}

/// Forces the chart type named by intent keywords in the question. The
/// displaced primary moves to the front of the alternatives.
pub fn apply_intent_override(recommendation: Recommendation, question: &str) -> Recommendation {
    let Some(intent) = detect_intent(question) else {
        return recommendation;
    };
    let forced = intent.category.chart_type();
    if forced == recommendation.primary_type {
        return recommendation;
    }
    info!(
        keyword = intent.keyword,
        from = %recommendation.primary_type,
        to = %forced,
        "User intent overrides chart type"
    );
    let mut alternatives = Vec::with_capacity(recommendation.alternatives.len() + 1);
    alternatives.push(Alternative {
        chart_type: recommendation.primary_type,
        confidence: recommendation.confidence,
        reason: recommendation.reason,
    });
    alternatives.extend(recommendation.alternatives);
    Recommendation::new(
        forced,
        recommendation.confidence,
        format!(
            "Question asks for {} (keyword '{}')",
            intent.category.label(),
            intent.keyword
        ),
    )
    .with_alternatives(alternatives)
}
