//! Hugging Face hosted inference backend.
//!
//! Uses reqwest against `POST {base}/models/{model_id}` with a bearer token.

use crate::capability::{CapabilityError, Generate, Summarize};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("connprep/", env!("CARGO_PKG_VERSION"));

/// How much of the input stands in for a summary the API returned in an unknown shape
const FALLBACK_EXCERPT_CHARS: usize = 400;

/// Sampling temperature when non-deterministic output is requested
const SAMPLING_TEMPERATURE: f32 = 0.2;

/// Client for one hosted model
pub struct HuggingFaceClient {
    http: Client,
    base_url: String,
    token: String,
    model: String,
}

impl HuggingFaceClient {
    pub fn new(
        token: impl Into<String>,
        model: impl Into<String>,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, CapabilityError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            token: token.into(),
            model: model.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    /// Post an inference request and decode the JSON reply
    async fn call(&self, inputs: &str, parameters: Value) -> Result<Value, CapabilityError> {
        let url = self.endpoint();
        debug!(model = %self.model, input_chars = inputs.len(), "calling hosted inference");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "inputs": inputs, "parameters": parameters }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CapabilityError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| CapabilityError::UnexpectedResponse(format!("{e}: {}", crate::capability::preview_body(&body))))
    }
}

/// Pull `field` out of `[{field: ..}]`, `{field: ..}` or a bare string
pub fn response_text(value: &Value, field: &str) -> Option<String> {
    match value {
        Value::Array(items) => items.first().and_then(|item| response_text(item, field)),
        Value::Object(map) => map.get(field).and_then(Value::as_str).map(str::to_string),
        Value::String(text) => Some(text.clone()),
        _ => None,
    }
}

#[async_trait]
impl Summarize for HuggingFaceClient {
    async fn summarize(
        &self,
        text: &str,
        max_length: u32,
        min_length: u32,
    ) -> Result<String, CapabilityError> {
        let parameters = json!({
            "max_length": max_length,
            "min_length": min_length,
            "do_sample": false,
        });
        let reply = self.call(text, parameters).await?;

        match response_text(&reply, "summary_text") {
            Some(summary) => Ok(summary),
            None => {
                warn!(model = %self.model, "unrecognized summarization response, using an excerpt of the input");
                Ok(text.chars().take(FALLBACK_EXCERPT_CHARS).collect())
            }
        }
    }
}

#[async_trait]
impl Generate for HuggingFaceClient {
    async fn generate(
        &self,
        prompt: &str,
        max_output_length: u32,
        deterministic: bool,
    ) -> Result<String, CapabilityError> {
        let mut parameters = json!({
            "max_new_tokens": max_output_length,
            "do_sample": !deterministic,
            "return_full_text": false,
        });
        if !deterministic {
            parameters["temperature"] = json!(SAMPLING_TEMPERATURE);
        }
        let reply = self.call(prompt, parameters).await?;

        // some models answer in a shape of their own; keep it rather than lose it
        Ok(response_text(&reply, "generated_text").unwrap_or_else(|| reply.to_string()))
    }
}
