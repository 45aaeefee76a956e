use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

/// Default location of the prebuilt similarity index bundle.
pub const DEFAULT_VECTORSTORE_PATH: &str = "results/faiss_vectorstore";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;
const DEFAULT_COMPLETION_MODEL: &str = "gpt-3.5-turbo-instruct";
const DEFAULT_COMPLETION_MAX_TOKENS: u32 = 256;
const DEFAULT_TOP_K: usize = 3;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the report assistant.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Credential for the hosted model-serving API.
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API (without trailing endpoint path).
    pub openai_base_url: String,
    /// Embedding model used for query vectors; must match the one the index was built with.
    pub embedding_model: String,
    /// Dimensionality of the produced vectors.
    pub embedding_dimension: usize,
    /// Completion model used for answers and summaries.
    pub completion_model: String,
    /// Sampling temperature passed to the completion model.
    pub completion_temperature: f32,
    /// Upper bound on generated tokens per completion.
    pub completion_max_tokens: u32,
    /// Directory holding the persisted similarity index.
    pub vectorstore_path: PathBuf,
    /// Number of chunks retrieved per question.
    pub retriever_top_k: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            openai_api_key: load_env("OPENAI_API_KEY")?,
            openai_base_url: load_env_optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            embedding_model: load_env_optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension: parse_optional("EMBEDDING_DIMENSION")?
                .unwrap_or(DEFAULT_EMBEDDING_DIMENSION),
            completion_model: load_env_optional("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            completion_temperature: parse_optional("COMPLETION_TEMPERATURE")?.unwrap_or(0.0),
            completion_max_tokens: parse_optional("COMPLETION_MAX_TOKENS")?
                .unwrap_or(DEFAULT_COMPLETION_MAX_TOKENS),
            vectorstore_path: load_env_optional("VECTORSTORE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_VECTORSTORE_PATH)),
            retriever_top_k: parse_optional("RETRIEVER_TOP_K")?.unwrap_or(DEFAULT_TOP_K),
            server_port: parse_optional("SERVER_PORT")?,
        };

        if config.openai_api_key.trim().is_empty() {
            return Err(ConfigError::MissingVariable("OPENAI_API_KEY".into()));
        }
        if config.embedding_dimension == 0 {
            return Err(ConfigError::InvalidValue("EMBEDDING_DIMENSION".into()));
        }
        if config.retriever_top_k == 0 {
            return Err(ConfigError::InvalidValue("RETRIEVER_TOP_K".into()));
        }

        Ok(config)
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the process-wide cache.
///
/// A `.env` file in the working directory is honoured when present. Repeated calls return
/// the configuration installed by the first successful call.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        base_url = %config.openai_base_url,
        embedding_model = %config.embedding_model,
        embedding_dimension = config.embedding_dimension,
        completion_model = %config.completion_model,
        vectorstore = %config.vectorstore_path.display(),
        top_k = config.retriever_top_k,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
