//! Locally hosted model backend (Ollama's `/api/generate`).

use crate::capability::{preview_body, CapabilityError, Generate, Summarize};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_HOST: &str = "http://localhost:11434";

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaClient {
    http: Client,
    host: String,
    model: String,
}

impl OllamaClient {
    pub fn new(
        host: Option<&str>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CapabilityError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            host: host.unwrap_or(DEFAULT_HOST).trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    async fn complete(
        &self,
        prompt: &str,
        num_predict: u32,
        temperature: f32,
    ) -> Result<String, CapabilityError> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "calling local model");
        let response = self
            .http
            .post(format!("{}/api/generate", self.host))
            .json(&json!({
                "model": self.model,
                "prompt": prompt,
                "stream": false,
                "options": {
                    "num_predict": num_predict,
                    "temperature": temperature,
                },
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(CapabilityError::from_status(status.as_u16(), &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| CapabilityError::UnexpectedResponse(format!("{e}: {}", preview_body(&body))))?;
        Ok(parsed.response)
    }
}

#[async_trait]
impl Summarize for OllamaClient {
    async fn summarize(
        &self,
        text: &str,
        max_length: u32,
        min_length: u32,
    ) -> Result<String, CapabilityError> {
        self.complete(&summary_prompt(text, max_length, min_length), max_length, 0.0)
            .await
    }
}

#[async_trait]
impl Generate for OllamaClient {
    async fn generate(
        &self,
        prompt: &str,
        max_output_length: u32,
        deterministic: bool,
    ) -> Result<String, CapabilityError> {
        let temperature = if deterministic { 0.0 } else { 0.2 };
        self.complete(prompt, max_output_length, temperature).await
    }
}

/// Instruction used by chat-style models that have no dedicated summarization head
pub fn summary_prompt(text: &str, max_length: u32, min_length: u32) -> String {
    format!(
        "Summarize the following text in plain prose, between {min_length} and {max_length} words. \
Keep names, roles, companies and topics; do not add anything that is not in the text. \
Reply with the summary only.\n\n---\n\n{text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn generate_posts_non_streaming_request() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama3.2",
                "stream": false,
                "options": {"num_predict": 400, "temperature": 0.0}
            })))
            .with_status(200)
            .with_body(r#"{"model": "llama3.2", "response": "{\"icebreakers\": []}", "done": true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(Some(&server.url()), "llama3.2", Duration::from_secs(5)).unwrap();
        let text = client.generate("prompt", 400, true).await.unwrap();
        assert_eq!(text, r#"{"icebreakers": []}"#);
    }

    #[tokio::test]
    async fn summarize_wraps_text_in_instruction() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::Regex("between 40 and 150 words".into()))
            .with_status(200)
            .with_body(r#"{"response": "short"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(Some(&server.url()), "llama3.2", Duration::from_secs(5)).unwrap();
        assert_eq!(client.summarize("text", 150, 40).await.unwrap(), "short");
    }

    #[tokio::test]
    async fn model_not_found_is_status_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error": "model not found"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(Some(&server.url()), "nope", Duration::from_secs(5)).unwrap();
        let err = client.generate("prompt", 10, true).await.unwrap_err();
        assert!(matches!(err, CapabilityError::Status { status: 404, .. }));
    }
}
