//! The end-to-end run: summarize profile and posts, then synthesize the brief.

use crate::brief::Brief;
use crate::capability::CapabilityError;
use crate::config::{clamp_bullets, BriefConfig, ChunkingConfig, Config};
use crate::engine::{Engine, EngineError};
use crate::input::InputBundle;
use crate::prompt::BriefRequest;
use crate::summarizer::ChunkedSummarizer;
use crate::synthesizer::BriefSynthesizer;
use std::fmt;
use thiserror::Error;
use tracing::info;

/// Which model call a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summarization,
    Generation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Summarization => f.write_str("Summarization"),
            Stage::Generation => f.write_str("Generation"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no credential configured for {0}; set it in the environment or connprep.toml")]
    MissingCredential(&'static str),
    #[error("{stage} failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: CapabilityError,
    },
    #[error(transparent)]
    Engine(EngineError),
}

impl From<EngineError> for PipelineError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::MissingCredential(provider) => PipelineError::MissingCredential(provider),
            other => PipelineError::Engine(other),
        }
    }
}

/// Per-run settings passed through to the two components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub chunking: ChunkingConfig,
    pub request: BriefRequest,
    pub profile_max_length: u32,
    pub profile_min_length: u32,
    pub posts_max_length: u32,
    pub posts_min_length: u32,
    pub generation_max_length: u32,
}

impl PipelineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.chunking, &config.brief)
    }

    pub fn new(chunking: ChunkingConfig, brief: &BriefConfig) -> Self {
        Self {
            chunking,
            request: BriefRequest {
                max_bullets: clamp_bullets(brief.max_bullets),
                include_agenda: brief.include_agenda,
                include_outreach: brief.include_outreach,
            },
            profile_max_length: brief.profile_max_length,
            profile_min_length: brief.profile_min_length,
            posts_max_length: brief.posts_max_length,
            posts_min_length: brief.posts_min_length,
            generation_max_length: brief.generation_max_length,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new(ChunkingConfig::default(), &BriefConfig::default())
    }
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub profile_summary: String,
    pub posts_summary: String,
    pub brief: Brief,
}

/// Run the pipeline with an already-built engine
pub async fn run(
    engine: &Engine,
    input: &InputBundle,
    options: &PipelineOptions,
) -> Result<PipelineOutput, PipelineError> {
    let summarizer = ChunkedSummarizer::new(engine.summarizer(), options.chunking);

    info!("summarizing profile");
    let profile_summary = summarizer
        .summarize_long(
            &input.profile_text,
            options.profile_max_length,
            options.profile_min_length,
        )
        .await
        .map_err(|source| PipelineError::StageFailed {
            stage: Stage::Summarization,
            source,
        })?;

    info!("summarizing posts");
    let posts_summary = summarizer
        .summarize_long(
            &input.posts_text,
            options.posts_max_length,
            options.posts_min_length,
        )
        .await
        .map_err(|source| PipelineError::StageFailed {
            stage: Stage::Summarization,
            source,
        })?;

    info!("generating brief");
    let brief = BriefSynthesizer::new(engine.generator(), options.generation_max_length)
        .synthesize(
            &profile_summary,
            &posts_summary,
            &input.meeting_goal,
            &options.request,
        )
        .await
        .map_err(|source| PipelineError::StageFailed {
            stage: Stage::Generation,
            source,
        })?;

    Ok(PipelineOutput {
        profile_summary,
        posts_summary,
        brief,
    })
}

/// Resolve the cached engine for `config` and run.
///
/// A missing credential is reported before any model is called.
pub async fn run_with_config(
    config: &Config,
    input: &InputBundle,
) -> Result<PipelineOutput, PipelineError> {
    let engine = Engine::cached(&config.engine, &config.api)?;
    run(&engine, input, &PipelineOptions::from_config(config)).await
}
