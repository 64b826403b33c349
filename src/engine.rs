//! Backend selection and the process-wide engine cache.
//!
//! Building a backend means building HTTP clients (and checking credentials),
//! so engines are memoized per distinct configuration and shared for the
//! lifetime of the process.

use crate::capability::{CapabilityError, Generate, Summarize};
use crate::config::{ApiConfig, Backend, EngineConfig};
use crate::extractive::ExtractiveSummarizer;
use crate::gemini::GeminiBackend;
use crate::huggingface::HuggingFaceClient;
use crate::ollama::OllamaClient;
use lazy_static::lazy_static;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("missing credential for {0}")]
    MissingCredential(&'static str),
    #[error("{backend} cannot be used for {role}")]
    Unsupported { backend: Backend, role: &'static str },
    #[error("failed to build {backend} client: {source}")]
    Build {
        backend: Backend,
        #[source]
        source: CapabilityError,
    },
}

lazy_static! {
    static ref ENGINES: Mutex<HashMap<u64, Arc<Engine>>> = Mutex::new(HashMap::new());
}

/// A summarizer and a generator, ready to use
pub struct Engine {
    summarizer: Arc<dyn Summarize>,
    generator: Arc<dyn Generate>,
}

impl Engine {
    /// Wrap existing capabilities (tests, embedding applications)
    pub fn new(summarizer: Arc<dyn Summarize>, generator: Arc<dyn Generate>) -> Self {
        Self {
            summarizer,
            generator,
        }
    }

    /// Build an engine from configuration, bypassing the cache
    pub fn build(config: &EngineConfig, api: &ApiConfig) -> Result<Self, EngineError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let summarizer = build_summarizer(config, api, timeout)?;
        let generator = build_generator(config, api, timeout)?;
        Ok(Self::new(summarizer, generator))
    }

    /// The engine for this configuration, built on first use
    pub fn cached(config: &EngineConfig, api: &ApiConfig) -> Result<Arc<Self>, EngineError> {
        let key = cache_key(config, api);
        let mut engines = ENGINES.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(engine) = engines.get(&key) {
            debug!(key, "reusing cached engine");
            return Ok(Arc::clone(engine));
        }

        debug!(
            key,
            summarizer = %config.summarizer,
            generator = %config.generator,
            "building engine"
        );
        let engine = Arc::new(Self::build(config, api)?);
        engines.insert(key, Arc::clone(&engine));
        Ok(engine)
    }

    pub fn summarizer(&self) -> &dyn Summarize {
        self.summarizer.as_ref()
    }

    pub fn generator(&self) -> &dyn Generate {
        self.generator.as_ref()
    }
}

/// Hash of everything that changes what the engine would be built as
fn cache_key(config: &EngineConfig, api: &ApiConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.hash(&mut hasher);
    api.hf_token.hash(&mut hasher);
    api.gemini_key.hash(&mut hasher);
    hasher.finish()
}

fn credential(api: &ApiConfig, backend: Backend) -> Result<&str, EngineError> {
    api.credential(backend)
        .ok_or(EngineError::MissingCredential(backend.as_str()))
}

fn build_summarizer(
    config: &EngineConfig,
    api: &ApiConfig,
    timeout: Duration,
) -> Result<Arc<dyn Summarize>, EngineError> {
    let backend = config.summarizer;
    let model = config.summarizer_model();
    let built: Arc<dyn Summarize> = match backend {
        Backend::Huggingface => Arc::new(
            HuggingFaceClient::new(
                credential(api, backend)?,
                model,
                config.huggingface_url.as_deref(),
                timeout,
            )
            .map_err(|source| EngineError::Build { backend, source })?,
        ),
        Backend::Gemini => Arc::new(
            GeminiBackend::new(credential(api, backend)?, model, timeout)
                .map_err(|source| EngineError::Build { backend, source })?,
        ),
        Backend::Ollama => Arc::new(
            OllamaClient::new(config.ollama_host.as_deref(), model, timeout)
                .map_err(|source| EngineError::Build { backend, source })?,
        ),
        Backend::Extractive => Arc::new(ExtractiveSummarizer::new()),
    };
    Ok(built)
}

fn build_generator(
    config: &EngineConfig,
    api: &ApiConfig,
    timeout: Duration,
) -> Result<Arc<dyn Generate>, EngineError> {
    let backend = config.generator;
    let model = config.generator_model();
    let built: Arc<dyn Generate> = match backend {
        Backend::Huggingface => Arc::new(
            HuggingFaceClient::new(
                credential(api, backend)?,
                model,
                config.huggingface_url.as_deref(),
                timeout,
            )
            .map_err(|source| EngineError::Build { backend, source })?,
        ),
        Backend::Gemini => Arc::new(
            GeminiBackend::new(credential(api, backend)?, model, timeout)
                .map_err(|source| EngineError::Build { backend, source })?,
        ),
        Backend::Ollama => Arc::new(
            OllamaClient::new(config.ollama_host.as_deref(), model, timeout)
                .map_err(|source| EngineError::Build { backend, source })?,
        ),
        Backend::Extractive => {
            return Err(EngineError::Unsupported {
                backend,
                role: "generation",
            })
        }
    };
    Ok(built)
}
