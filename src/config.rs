use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::models::ScoringWeights;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub embeddings: EmbeddingSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Remote OpenAI-compatible embeddings API
    OpenAi,
    /// Deterministic local feature hashing
    Hash,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingSettings {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    pub cache_size: Option<u64>,
    pub cache_ttl_secs: Option<u64>,
}

fn default_dimension() -> usize { 1536 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    pub default_top_k: Option<usize>,
    pub max_top_k: Option<usize>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            default_top_k: Some(5),
            max_top_k: Some(100),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: WeightsConfig,
    pub learned_model_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_emotional_weight")]
    pub emotional_similarity: f64,
    #[serde(default = "default_experience_weight")]
    pub experience_overlap: f64,
    #[serde(default = "default_coping_weight")]
    pub coping_style_match: f64,
    #[serde(default = "default_conversation_weight")]
    pub conversation_style_match: f64,
    #[serde(default = "default_availability_weight")]
    pub availability_overlap: f64,
    #[serde(default = "default_reliability_weight")]
    pub reliability_score: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            emotional_similarity: default_emotional_weight(),
            experience_overlap: default_experience_weight(),
            coping_style_match: default_coping_weight(),
            conversation_style_match: default_conversation_weight(),
            availability_overlap: default_availability_weight(),
            reliability_score: default_reliability_weight(),
        }
    }
}

impl From<&WeightsConfig> for ScoringWeights {
    fn from(config: &WeightsConfig) -> Self {
        ScoringWeights {
            emotional_similarity: config.emotional_similarity,
            experience_overlap: config.experience_overlap,
            coping_style_match: config.coping_style_match,
            conversation_style_match: config.conversation_style_match,
            availability_overlap: config.availability_overlap,
            reliability_score: config.reliability_score,
        }
    }
}

fn default_emotional_weight() -> f64 { 0.30 }
fn default_experience_weight() -> f64 { 0.25 }
fn default_coping_weight() -> f64 { 0.15 }
fn default_conversation_weight() -> f64 { 0.10 }
fn default_availability_weight() -> f64 { 0.10 }
fn default_reliability_weight() -> f64 { 0.10 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with PEERLINK_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., PEERLINK__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        let settings = substitute_env_vars(settings)?;

        settings.try_deserialize::<Settings>()?.checked()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize::<Settings>()?.checked()
    }

    /// Reject settings the service cannot start with
    fn checked(self) -> Result<Self, ConfigError> {
        ScoringWeights::from(&self.scoring.weights)
            .check()
            .map_err(|e| ConfigError::Message(format!("scoring.weights: {}", e)))?;

        if self.embeddings.dimension == 0 {
            return Err(ConfigError::Message("embeddings.dimension must be positive".to_string()));
        }

        if self.embeddings.provider == ProviderKind::OpenAi
            && self.embeddings.api_key.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::Message(
                "embeddings.api_key (or OPENAI_API_KEY) is required for the openai provider".to_string(),
            ));
        }

        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("PEERLINK")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Pull well-known variables into the config tree
///
/// `OPENAI_API_KEY` fills `embeddings.api_key` unless one is already set.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let configured = settings
        .get_string("embeddings.api_key")
        .ok()
        .filter(|key| !key.is_empty());

    let mut builder = Config::builder().add_source(settings);

    if configured.is_none() {
        if let Ok(api_key) = env::var("OPENAI_API_KEY") {
            builder = builder.set_override("embeddings.api_key", api_key)?;
        }
    }

    builder.build()
}
