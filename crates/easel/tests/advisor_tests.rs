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

use async_trait::async_trait;
use common::category_value_dataset;
use easel::advisor::{apply_intent_override, map_response, HEURISTIC_CONFIDENCE};
use easel::config::AdvisorConfig;
use easel::{
    AdvisorOptions, ChartAdvisor, ChartType, HttpInferenceBackend, InferenceBackend,
    Recommendation,
};
use easel_contracts::{
    AdvisorAlternative, AdvisorError, AdvisorRequest, AdvisorResponse, AdvisorResult,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

enum Behaviour {
    Respond(AdvisorResponse),
    Fail,
    Stall,
}

struct MockBackend {
    behaviour: Behaviour,
    calls: AtomicUsize,
    last_request: Mutex<Option<AdvisorRequest>>,
}

impl MockBackend {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn recommend(&self, request: &AdvisorRequest) -> AdvisorResult<AdvisorResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.behaviour {
            Behaviour::Respond(response) => Ok(response.clone()),
            Behaviour::Fail => Err(AdvisorError::Network("connection refused".into())),
            Behaviour::Stall => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(AdvisorError::Network("unreachable".into()))
            }
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn enabled_config() -> AdvisorConfig {
    AdvisorConfig {
        enabled: true,
        endpoint: Some("http://inference.local/recommend".into()),
        ..AdvisorConfig::default()
    }
}

fn scatter_response() -> AdvisorResponse {
    AdvisorResponse {
        primary_type: Some("scatter".into()),
        primary_confidence: Some(0.92),
        primary_reason: Some("two measures".into()),
        alternatives: Some(vec![
            AdvisorAlternative {
                chart_type: "bar".into(),
                confidence: Some(0.6),
                reason: None,
            },
            AdvisorAlternative {
                chart_type: "sunburst".into(),
                confidence: Some(0.5),
                reason: None,
            },
            AdvisorAlternative {
                chart_type: "line".into(),
                confidence: None,
                reason: Some("ordered".into()),
            },
        ]),
    }
}

#[tokio::test]
async fn test_heuristic_only_recommendation() {
    let advisor = ChartAdvisor::heuristic_only();
    let rec = advisor
        .select_chart_type(&category_value_dataset(20), None)
        .await;
    assert_eq!(rec.primary_type, ChartType::Bar);
    assert!((rec.confidence - HEURISTIC_CONFIDENCE).abs() < f64::EPSILON);
    assert_eq!(rec.alternative_types(), vec![ChartType::Line, ChartType::Pie]);
    assert!(!rec.reason.is_empty());
}

#[tokio::test]
async fn test_backend_response_is_used() {
    let backend = MockBackend::new(Behaviour::Respond(scatter_response()));
    let advisor = ChartAdvisor::with_backend(backend.clone(), &enabled_config());
    let rec = advisor
        .select_chart_type(&category_value_dataset(20), None)
        .await;

    assert_eq!(backend.calls(), 1);
    assert_eq!(rec.primary_type, ChartType::Scatter);
    assert!((rec.confidence - 0.92).abs() < f64::EPSILON);
    assert_eq!(rec.alternative_types(), vec![ChartType::Bar, ChartType::Line]);
    assert!((rec.alternatives[1].confidence - 0.8).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_request_carries_at_most_five_sample_rows() {
    let backend = MockBackend::new(Behaviour::Respond(AdvisorResponse::default()));
    let advisor = ChartAdvisor::with_backend(backend.clone(), &enabled_config());
    let options = AdvisorOptions {
        timeout: None,
        context_text: Some("quarterly sales".into()),
    };
    advisor
        .select_chart_type_with(&category_value_dataset(40), Some("which region?"), &options)
        .await;

    let request = backend.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.sample_rows.len(), 5);
    assert_eq!(request.columns, vec!["region", "sales"]);
    assert_eq!(request.feature_profile.row_count, 40);
    assert_eq!(request.user_question.as_deref(), Some("which region?"));
    assert_eq!(request.context_text.as_deref(), Some("quarterly sales"));
}

#[tokio::test]
async fn test_backend_failure_falls_back_to_heuristics() {
    let backend = MockBackend::new(Behaviour::Fail);
    let advisor = ChartAdvisor::with_backend(backend.clone(), &enabled_config());
    let dataset = category_value_dataset(6);

    let rec = advisor.select_chart_type(&dataset, None).await;
    let heuristic = ChartAdvisor::heuristic_only()
        .select_chart_type(&dataset, None)
        .await;

    assert_eq!(backend.calls(), 1);
    assert_eq!(rec, heuristic);
    assert_eq!(rec.primary_type, ChartType::Pie);
}

#[tokio::test(start_paused = true)]
async fn test_slow_backend_times_out() {
    let backend = MockBackend::new(Behaviour::Stall);
    let advisor = ChartAdvisor::with_backend(backend.clone(), &enabled_config());
    let rec = advisor
        .select_chart_type_with(
            &category_value_dataset(20),
            None,
            &AdvisorOptions::with_timeout(Duration::from_millis(250)),
        )
        .await;
    assert_eq!(backend.calls(), 1);
    assert_eq!(rec.primary_type, ChartType::Bar);
    assert!((rec.confidence - HEURISTIC_CONFIDENCE).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_disabled_ai_never_calls_backend() {
    let backend = MockBackend::new(Behaviour::Respond(scatter_response()));
    let mut advisor = ChartAdvisor::with_backend(backend.clone(), &enabled_config());
    advisor.set_ai_enabled(false);
    assert!(!advisor.is_ai_enabled());

    let rec = advisor
        .select_chart_type(&category_value_dataset(20), Some("what is the growth?"))
        .await;
    assert_eq!(backend.calls(), 0);
    assert_eq!(rec.primary_type, ChartType::Line);
}

#[tokio::test]
async fn test_unknown_primary_type_falls_back() {
    let backend = MockBackend::new(Behaviour::Respond(AdvisorResponse {
        primary_type: Some("treemap".into()),
        ..AdvisorResponse::default()
    }));
    let advisor = ChartAdvisor::with_backend(backend.clone(), &enabled_config());
    let rec = advisor
        .select_chart_type(&category_value_dataset(20), None)
        .await;
    assert_eq!(backend.calls(), 1);
    assert_eq!(rec.primary_type, ChartType::Bar);
    assert!((rec.confidence - HEURISTIC_CONFIDENCE).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_intent_overrides_heuristic_choice() {
    let advisor = ChartAdvisor::heuristic_only();
    let rec = advisor
        .select_chart_type(&category_value_dataset(20), Some("显示增长趋势"))
        .await;
    assert_eq!(rec.primary_type, ChartType::Line);
    assert_eq!(rec.alternatives[0].chart_type, ChartType::Bar);
    assert!(rec.reason.contains("趋势"));
    assert!(rec.alternatives.len() <= Recommendation::MAX_ALTERNATIVES);
}

#[tokio::test]
async fn test_intent_overrides_backend_choice() {
    let backend = MockBackend::new(Behaviour::Respond(scatter_response()));
    let advisor = ChartAdvisor::with_backend(backend, &enabled_config());
    let rec = advisor
        .select_chart_type(&category_value_dataset(20), Some("Show the market share"))
        .await;
    assert_eq!(rec.primary_type, ChartType::Pie);
    assert_eq!(
        rec.alternative_types(),
        vec![ChartType::Scatter, ChartType::Bar]
    );
}

#[test]
fn test_map_response_defaults() {
    let rec = map_response(AdvisorResponse::default()).unwrap();
    assert_eq!(rec.primary_type, ChartType::Bar);
    assert!((rec.confidence - 0.8).abs() < f64::EPSILON);
    assert!(rec.alternatives.is_empty());

    let err = map_response(AdvisorResponse {
        primary_type: Some("donut".into()),
        ..AdvisorResponse::default()
    })
    .unwrap_err();
    assert!(matches!(err, AdvisorError::UnknownChartType(t) if t == "donut"));
}

#[test]
fn test_override_keeps_matching_primary() {
    let rec = Recommendation::new(ChartType::Line, 0.9, "already a trend");
    let same = apply_intent_override(rec.clone(), "revenue trend by month");
    assert_eq!(same, rec);

    let untouched = apply_intent_override(rec.clone(), "show me the numbers");
    assert_eq!(untouched, rec);
}

#[tokio::test]
async fn test_http_backend_decodes_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recommend"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "primaryType": "radar",
            "primaryConfidence": 0.77,
            "primaryReason": "many measures",
            "alternatives": [{ "type": "bar", "confidence": 0.4 }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = Arc::new(HttpInferenceBackend::new(format!("{}/recommend", server.uri())).unwrap());
    let advisor = ChartAdvisor::with_backend(backend, &enabled_config());
    let rec = advisor
        .select_chart_type(&category_value_dataset(20), None)
        .await;
    assert_eq!(rec.primary_type, ChartType::Radar);
    assert_eq!(rec.reason, "many measures");
    assert_eq!(rec.alternative_types(), vec![ChartType::Bar]);
}

#[tokio::test]
async fn test_http_backend_reports_status_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recommend"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let backend = HttpInferenceBackend::new(format!("{}/recommend", server.uri())).unwrap();
    let request = AdvisorRequest {
        feature_profile: easel::FeatureProfile::new(1, 1, 0, 3),
        user_question: None,
        context_text: None,
        columns: vec!["a".into(), "b".into()],
        sample_rows: vec![],
    };
    let err = backend.recommend(&request).await.unwrap_err();
    assert!(matches!(err, AdvisorError::Status(500)));

    let advisor = ChartAdvisor::with_backend(Arc::new(backend), &enabled_config());
    let rec = advisor
        .select_chart_type(&category_value_dataset(3), None)
        .await;
    assert_eq!(rec.primary_type, ChartType::Pie);
}
