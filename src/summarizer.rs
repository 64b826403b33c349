//! Chunked summarization for inputs longer than a model's context window.

use crate::capability::{CapabilityError, Summarize};
use crate::chunk;
use crate::config::ChunkingConfig;
use tracing::{debug, warn};

/// Summarizes arbitrarily long text with a length-limited [`Summarize`] capability.
///
/// Text is cut into overlapping windows, each window is summarized on its own,
/// and when more than one window was needed the partial summaries are joined
/// and summarized once more.
pub struct ChunkedSummarizer<'a> {
    capability: &'a dyn Summarize,
    chunking: ChunkingConfig,
}

impl<'a> ChunkedSummarizer<'a> {
    pub fn new(capability: &'a dyn Summarize, chunking: ChunkingConfig) -> Self {
        Self {
            capability,
            chunking,
        }
    }

    /// Summarize `text` into a single digest.
    ///
    /// A chunk whose call fails is replaced by a marker and the rest carry on.
    /// The call only fails when no chunk could be summarized at all.
    pub async fn summarize_long(
        &self,
        text: &str,
        max_length: u32,
        min_length: u32,
    ) -> Result<String, CapabilityError> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let chunks = chunk::split(text, self.chunking.chunk_size, self.chunking.overlap);
        debug!(
            chars = text.chars().count(),
            chunks = chunks.len(),
            "summarizing input"
        );

        let mut partials = Vec::with_capacity(chunks.len());
        let mut first_error = None;
        let mut succeeded = 0usize;

        for (index, chunk) in chunks.iter().enumerate() {
            match self
                .capability
                .summarize(&chunk.text, max_length, min_length)
                .await
            {
                Ok(summary) => {
                    succeeded += 1;
                    partials.push(summary.trim().to_string());
                }
                Err(e) => {
                    warn!(chunk = index + 1, of = chunks.len(), error = %e, "chunk summarization failed");
                    partials.push(failure_marker(index + 1, &e));
                    first_error.get_or_insert(e);
                }
            }
        }

        if succeeded == 0 {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        if partials.len() == 1 {
            return Ok(partials.remove(0));
        }

        let joined = partials.join(" ");
        debug!(partials = partials.len(), "merging partial summaries");
        match self
            .capability
            .summarize(&joined, max_length, min_length)
            .await
        {
            Ok(merged) => Ok(merged.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "merge pass failed, keeping joined partial summaries");
                Ok(joined)
            }
        }
    }
}

/// Placeholder standing in for a chunk that could not be summarized
pub fn failure_marker(chunk_number: usize, error: &CapabilityError) -> String {
    format!("[summary unavailable for segment {chunk_number}: {error}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every call and answers with a short tag, failing on request
    struct Recorder {
        calls: Mutex<Vec<String>>,
        fail_on: Vec<usize>,
    }

    impl Recorder {
        fn new() -> Self {
            Self::failing_on(vec![])
        }

        fn failing_on(fail_on: Vec<usize>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Summarize for Recorder {
        async fn summarize(
            &self,
            text: &str,
            _max_length: u32,
            _min_length: u32,
        ) -> Result<String, CapabilityError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(text.to_string());
            let n = calls.len();
            if self.fail_on.contains(&n) {
                return Err(CapabilityError::Backend(format!("boom {n}")));
            }
            Ok(format!("s{n}"))
        }
    }

    fn chunking() -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: 1600,
            overlap: 150,
        }
    }

    #[tokio::test]
    async fn blank_input_makes_no_calls() {
        let rec = Recorder::new();
        let out = ChunkedSummarizer::new(&rec, chunking())
            .summarize_long("  \n\t ", 150, 40)
            .await
            .unwrap();
        assert_eq!(out, "");
        assert!(rec.calls().is_empty());
    }

    #[tokio::test]
    async fn single_chunk_is_passed_through() {
        let rec = Recorder::new();
        let out = ChunkedSummarizer::new(&rec, chunking())
            .summarize_long("Senior PM at a fintech.", 150, 40)
            .await
            .unwrap();
        assert_eq!(out, "s1");
        assert_eq!(rec.calls(), vec!["Senior PM at a fintech.".to_string()]);
    }

    #[tokio::test]
    async fn long_input_gets_one_merge_pass() {
        let rec = Recorder::new();
        let text = "b".repeat(4000);
        let out = ChunkedSummarizer::new(&rec, chunking())
            .summarize_long(&text, 150, 40)
            .await
            .unwrap();

        let calls = rec.calls();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[3], "s1 s2 s3");
        assert_eq!(out, "s4");
    }

    #[tokio::test]
    async fn failing_chunk_degrades_to_marker() {
        let rec = Recorder::failing_on(vec![2]);
        let text = "c".repeat(4000);
        let out = ChunkedSummarizer::new(&rec, chunking())
            .summarize_long(&text, 150, 40)
            .await
            .unwrap();

        let calls = rec.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[3].starts_with("s1 [summary unavailable for segment 2: backend error: boom 2]"));
        assert!(calls[3].ends_with(" s3"));
        assert_eq!(out, "s4");
    }

    #[tokio::test]
    async fn all_chunks_failing_is_an_error() {
        let rec = Recorder::failing_on(vec![1, 2, 3]);
        let text = "d".repeat(4000);
        let result = ChunkedSummarizer::new(&rec, chunking())
            .summarize_long(&text, 150, 40)
            .await;
        assert!(matches!(result, Err(CapabilityError::Backend(msg)) if msg == "boom 1"));
        assert_eq!(rec.calls().len(), 3);
    }

    #[tokio::test]
    async fn single_chunk_failure_is_an_error() {
        let rec = Recorder::failing_on(vec![1]);
        let result = ChunkedSummarizer::new(&rec, chunking())
            .summarize_long("short", 150, 40)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn failed_merge_keeps_partials() {
        let rec = Recorder::failing_on(vec![4]);
        let text = "e".repeat(4000);
        let out = ChunkedSummarizer::new(&rec, chunking())
            .summarize_long(&text, 150, 40)
            .await
            .unwrap();
        assert_eq!(out, "s1 s2 s3");
    }
}
