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

use super::InferenceBackend;
use async_trait::async_trait;
use easel_contracts::{AdvisorError, AdvisorRequest, AdvisorResponse, AdvisorResult};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

/// Posts the advisor request as JSON to a single endpoint and decodes the
/// recommendation payload. One attempt per call; the advisor owns timeouts
/// and fallback.
#[derive(Debug, Clone)]
pub struct HttpInferenceBackend {
    client: Client,
    endpoint: String,
}

impl HttpInferenceBackend {
    pub fn new(endpoint: impl Into<String>) -> AdvisorResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AdvisorError::Network(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::with_client(client, endpoint))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn parse_response(data: Value) -> AdvisorResult<AdvisorResponse> {
        if !data.is_object() {
            return Err(AdvisorError::Malformed(format!(
                "expected a JSON object, got {data}"
            )));
        }
        serde_json::from_value(data).map_err(|e| AdvisorError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl InferenceBackend for HttpInferenceBackend {
    async fn recommend(&self, request: &AdvisorRequest) -> AdvisorResult<AdvisorResponse> {
        debug!(endpoint = %self.endpoint, "Sending chart recommendation request");
        let resp = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| AdvisorError::Network(format!("Request failed: {e}")))?;

        let status = resp.status();
        info!("Received response from inference endpoint: {}", status);
        if !status.is_success() {
            return Err(AdvisorError::Status(status.as_u16()));
        }

        let data = resp
            .json::<Value>()
            .await
            .map_err(|e| AdvisorError::Malformed(format!("Failed to parse JSON response: {e}")))?;
        Self::parse_response(data)
    }

    fn name(&self) -> &str {
        "http"
    }
}
