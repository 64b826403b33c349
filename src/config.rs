//! Configuration loading and management for connprep.
//!
//! Loads settings from `connprep.toml` with environment variable overrides for credentials.
//! Every section has defaults, so running without a config file is fine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Allowed range for the per-list bullet cap
pub const MIN_BULLETS: usize = 3;
pub const MAX_BULLETS: usize = 12;

const CONFIG_FILE_NAME: &str = "connprep.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which implementation backs a capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Hugging Face hosted inference API
    Huggingface,
    /// Google Gemini
    Gemini,
    /// Locally hosted Ollama server
    Ollama,
    /// In-process extractive summarizer (summarization only)
    Extractive,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Huggingface => "huggingface",
            Backend::Gemini => "gemini",
            Backend::Ollama => "ollama",
            Backend::Extractive => "extractive",
        }
    }

    /// Model used when the config names a backend but no model
    pub fn default_summarizer_model(self) -> &'static str {
        match self {
            Backend::Huggingface => "sshleifer/distilbart-cnn-12-6",
            Backend::Gemini => "gemini-2.0-flash",
            Backend::Ollama => "llama3.2",
            Backend::Extractive => "extractive",
        }
    }

    pub fn default_generator_model(self) -> &'static str {
        match self {
            Backend::Huggingface => "google/flan-t5-base",
            Backend::Gemini => "gemini-2.0-flash",
            Backend::Ollama => "llama3.2",
            Backend::Extractive => "extractive",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model backend selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub summarizer: Backend,
    /// Unset means the summarizer backend's default model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarizer_model: Option<String>,
    pub generator: Backend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator_model: Option<String>,
    /// Per-request timeout for remote backends
    pub timeout_secs: u64,
    /// Hugging Face inference endpoint (proxies, self-hosted inference)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub huggingface_url: Option<String>,
    /// Ollama server address; `OLLAMA_HOST` overrides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama_host: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            summarizer: Backend::Huggingface,
            summarizer_model: None,
            generator: Backend::Huggingface,
            generator_model: None,
            timeout_secs: 60,
            huggingface_url: None,
            ollama_host: None,
        }
    }
}

impl EngineConfig {
    pub fn summarizer_model(&self) -> &str {
        self.summarizer_model
            .as_deref()
            .unwrap_or_else(|| self.summarizer.default_summarizer_model())
    }

    pub fn generator_model(&self) -> &str {
        self.generator_model
            .as_deref()
            .unwrap_or_else(|| self.generator.default_generator_model())
    }
}

/// Sliding-window chunking parameters, in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1600,
            overlap: 150,
        }
    }
}

/// Brief content settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefConfig {
    pub max_bullets: usize,
    pub include_agenda: bool,
    pub include_outreach: bool,
    pub profile_max_length: u32,
    pub profile_min_length: u32,
    pub posts_max_length: u32,
    pub posts_min_length: u32,
    pub generation_max_length: u32,
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self {
            max_bullets: 5,
            include_agenda: true,
            include_outreach: true,
            profile_max_length: 150,
            profile_min_length: 40,
            posts_max_length: 120,
            posts_min_length: 30,
            generation_max_length: 400,
        }
    }
}

/// Credentials (loaded from environment)
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub hf_token: Option<String>,
    #[serde(default)]
    pub gemini_key: Option<String>,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("hf_token", &self.hf_token.as_deref().map(mask_secret))
            .field("gemini_key", &self.gemini_key.as_deref().map(mask_secret))
            .finish()
    }
}

impl ApiConfig {
    /// Credential for a backend, if that backend needs one
    pub fn credential(&self, backend: Backend) -> Option<&str> {
        match backend {
            Backend::Huggingface => self.hf_token.as_deref().filter(|t| !t.trim().is_empty()),
            Backend::Gemini => self.gemini_key.as_deref().filter(|t| !t.trim().is_empty()),
            Backend::Ollama | Backend::Extractive => None,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub brief: BriefConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from the default location (connprep.toml in cwd or home),
    /// falling back to built-in defaults when no file exists
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::read_file(&path)?,
            None => Config::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read_file(path)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Override credentials (and the Ollama address) from environment variables
    fn apply_env(&mut self) {
        if let Some(token) = env_non_empty("HF_TOKEN").or_else(|| env_non_empty("HUGGINGFACE_API_TOKEN")) {
            self.api.hf_token = Some(token);
        }
        if let Some(key) = env_non_empty("GEMINI_API_KEY") {
            self.api.gemini_key = Some(key);
        }
        if let Some(host) = env_non_empty("OLLAMA_HOST") {
            self.engine.ollama_host = Some(host);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE_NAME);
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home_config = dirs::home_dir()?
            .join(".config")
            .join("connprep")
            .join(CONFIG_FILE_NAME);
        home_config.exists().then_some(home_config)
    }

    /// Check the invariants the pipeline relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chunking = &self.chunking;
        if chunking.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be greater than zero".into()));
        }
        if chunking.overlap >= chunking.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                chunking.overlap, chunking.chunk_size
            )));
        }

        let brief = &self.brief;
        if brief.profile_min_length > brief.profile_max_length {
            return Err(ConfigError::Invalid(
                "profile_min_length exceeds profile_max_length".into(),
            ));
        }
        if brief.posts_min_length > brief.posts_max_length {
            return Err(ConfigError::Invalid(
                "posts_min_length exceeds posts_max_length".into(),
            ));
        }
        if brief.generation_max_length == 0 {
            return Err(ConfigError::Invalid("generation_max_length must be greater than zero".into()));
        }

        if self.engine.generator == Backend::Extractive {
            return Err(ConfigError::Invalid(
                "the extractive backend can only summarize; pick another generator".into(),
            ));
        }
        Ok(())
    }

    /// Render the config as TOML with credentials masked
    pub fn to_masked_toml(&self) -> Result<String, toml::ser::Error> {
        let mut masked = self.clone();
        masked.api.hf_token = masked.api.hf_token.as_deref().map(mask_secret);
        masked.api.gemini_key = masked.api.gemini_key.as_deref().map(mask_secret);
        toml::to_string_pretty(&masked)
    }
}

/// Clamp a bullet count into `MIN_BULLETS..=MAX_BULLETS`
pub fn clamp_bullets(n: usize) -> usize {
    n.clamp(MIN_BULLETS, MAX_BULLETS)
}

fn env_non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}****")
}
