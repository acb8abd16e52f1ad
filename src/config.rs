use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Port used when neither `--port` nor `PORT` is provided.
pub const DEFAULT_PORT: u16 = 8080;
/// Base URL of the local Ollama runtime used when `OLLAMA_URL` is unset.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Model requested for student summaries when `SUMMARY_MODEL` is unset.
pub const DEFAULT_SUMMARY_MODEL: &str = "llama3";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the student records server.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port the HTTP server binds on all interfaces.
    pub server_port: u16,
    /// Base URL of the text-generation service.
    pub ollama_url: String,
    /// Model identifier sent with every summary request.
    pub summary_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: DEFAULT_PORT,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            server_port: optional("PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("PORT".into()))
                })
                .transpose()?
                .unwrap_or(defaults.server_port),
            ollama_url: optional("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            summary_model: optional("SUMMARY_MODEL").unwrap_or(defaults.summary_model),
        })
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load configuration from the environment and install it in the global cache.
///
/// Call after `.env` has been loaded and tracing is installed so the loaded values are logged.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    let config = Config::from_env()?;
    tracing::debug!(
        server_port = config.server_port,
        ollama_url = %config.ollama_url,
        summary_model = %config.summary_model,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
