//! # Connprep
//!
//! Meeting prep briefs from pasted professional-profile text.
//!
//! ## Features
//!
//! - **Chunked Summarization**: long profiles and posts are cut into overlapping windows,
//!   summarized piecewise and merged into one digest
//! - **Resilient Parsing**: structured sections are recovered from free model output,
//!   falling back to the raw text instead of failing
//! - **Pluggable Backends**: Hugging Face, Gemini (via rstructor), Ollama or an
//!   in-process extractive summarizer, chosen by configuration

pub mod brief;
pub mod capability;
pub mod chunk;
pub mod config;
pub mod engine;
pub mod extract;
pub mod extractive;
pub mod gemini;
pub mod huggingface;
pub mod input;
pub mod logging;
pub mod ollama;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod summarizer;
pub mod synthesizer;

pub use brief::{Brief, BriefSections, SectionKey, SectionValue};
pub use capability::{CapabilityError, Generate, Summarize};
pub use config::Config;
pub use engine::Engine;
pub use input::InputBundle;
pub use pipeline::{PipelineError, PipelineOptions, PipelineOutput, Stage};
pub use prompt::BriefRequest;
