//! Gemini backend.
//!
//! Uses rstructor's Gemini client for plain text completions.

use crate::capability::{CapabilityError, Generate, Summarize};
use crate::ollama::summary_prompt;
use async_trait::async_trait;
use rstructor::{GeminiClient, LLMClient};
use std::time::Duration;
use tracing::debug;

/// Temperature used when the caller does not ask for deterministic output
const SAMPLING_TEMPERATURE: f32 = 0.2;

pub struct GeminiBackend {
    client: GeminiClient,
    model: String,
}

impl GeminiBackend {
    /// Model names rstructor does not know are passed through as custom models
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self, CapabilityError> {
        let client = GeminiClient::new(api_key)
            .map_err(|e| CapabilityError::Backend(e.to_string()))?
            .model(model)
            .timeout(timeout);

        Ok(Self {
            client,
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        prompt: &str,
        max_tokens: Option<u32>,
        deterministic: bool,
    ) -> Result<String, CapabilityError> {
        debug!(
            model = %self.model,
            prompt_chars = prompt.len(),
            ?max_tokens,
            deterministic,
            "calling gemini"
        );
        let mut client = self.client.clone().temperature(temperature(deterministic));
        if let Some(max) = max_tokens {
            client = client.max_tokens(max);
        }
        let result = client
            .generate_with_metadata(prompt)
            .await
            .map_err(|e| CapabilityError::Backend(e.to_string()))?;
        Ok(result.text)
    }
}

fn temperature(deterministic: bool) -> f32 {
    if deterministic {
        0.0
    } else {
        SAMPLING_TEMPERATURE
    }
}

#[async_trait]
impl Summarize for GeminiBackend {
    async fn summarize(
        &self,
        text: &str,
        max_length: u32,
        min_length: u32,
    ) -> Result<String, CapabilityError> {
        self.complete(&summary_prompt(text, max_length, min_length), None, true)
            .await
    }
}

#[async_trait]
impl Generate for GeminiBackend {
    async fn generate(
        &self,
        prompt: &str,
        max_output_length: u32,
        deterministic: bool,
    ) -> Result<String, CapabilityError> {
        self.complete(prompt, Some(max_output_length), deterministic)
            .await
    }
}
