// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Text completion services used for summaries.

use crate::{InspectError, Result};
use async_trait::async_trait;
use diagnostics::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Turns a prompt into free text.
#[async_trait]
pub trait TextOracle: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Oracle used when no service is configured. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOracle;

#[async_trait]
impl TextOracle for DisabledOracle {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(InspectError::ExternalServiceFailure(
            "no text oracle configured".to_string(),
        ))
    }
}

/// Settings for [`HttpOracle`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleConfig {
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "mistral-large".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response keys that may hold the completion text, in preference order.
const ANSWER_KEYS: &[&str] = &["output", "text", "response", "completion"];

/// Oracle that POSTs `{model, prompt}` as JSON to an HTTP endpoint.
pub struct HttpOracle {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl HttpOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }
}

/// Pull the answer out of a response body: a known key of a JSON object,
/// or a bare JSON string. Anything else is an unrecognized response.
pub fn answer_from_body(body: &str) -> Result<String> {
    let answer = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ANSWER_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        Ok(Value::String(s)) => Some(s),
        _ => None,
    };
    answer
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| {
            let preview: String = body.chars().take(80).collect();
            InspectError::ExternalServiceFailure(format!("unrecognized response: {preview}"))
        })
}

#[async_trait]
impl TextOracle for HttpOracle {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = serde_json::to_string(&CompletionRequest {
            model: &self.model,
            prompt,
        })?;
        let endpoint = self.endpoint.as_str();
        let chars = prompt.chars().count();
        debug!("Requesting completion from {endpoint} ({chars} chars)", endpoint: endpoint, chars: chars);

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InspectError::ExternalServiceFailure(format!(
                "HTTP {status} from {endpoint}: {error_text}"
            )));
        }

        let text = response.text().await?;
        answer_from_body(&text)
    }
}
