//! Model capability traits.
//!
//! The pipeline only ever talks to a [`Summarize`] and a [`Generate`]
//! implementation; whether those run remotely or in-process is decided once,
//! when the [`crate::engine::Engine`] is built.

use async_trait::async_trait;
use thiserror::Error;

/// Longest response body kept in an error message
pub const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("not authorized (HTTP {status}): {body}")]
    Unauthorized { status: u16, body: String },
    #[error("rate limited (HTTP {status}): {body}")]
    RateLimited { status: u16, body: String },
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("backend error: {0}")]
    Backend(String),
}

impl CapabilityError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = preview_body(body);
        match status {
            401 | 403 => CapabilityError::Unauthorized { status, body },
            429 => CapabilityError::RateLimited { status, body },
            _ => CapabilityError::Status { status, body },
        }
    }
}

/// Turn text into a bounded-length summary
#[async_trait]
pub trait Summarize: Send + Sync {
    /// Summarize `text`; `max_length`/`min_length` are hints in model tokens
    async fn summarize(
        &self,
        text: &str,
        max_length: u32,
        min_length: u32,
    ) -> Result<String, CapabilityError>;
}

/// Produce free text from an instruction prompt
#[async_trait]
pub trait Generate: Send + Sync {
    /// Generate at most `max_output_length` tokens; `deterministic` disables sampling
    async fn generate(
        &self,
        prompt: &str,
        max_output_length: u32,
        deterministic: bool,
    ) -> Result<String, CapabilityError>;
}

/// Trim a response body down to something printable
pub fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    if trimmed.chars().count() <= BODY_PREVIEW_LIMIT {
        return trimmed.to_string();
    }
    let mut preview: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    preview.push_str("...");
    preview
}
