use crate::error::SemSearchError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// semsearch application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// JSONL corpus file
    pub corpus_path: PathBuf,

    /// Record key holding the text to embed
    pub text_key: String,

    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Number of texts sent per embedding request
    pub embed_batch_size: usize,

    /// Result count when a query does not specify one
    pub default_top_k: usize,

    /// Server bind address
    pub server_host: String,

    /// Server port
    pub server_port: u16,

    /// Log directory
    pub log_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("./data/corpus.jsonl"),
            text_key: "text".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            embedding_model: "all-minilm".to_string(),
            embed_batch_size: 32,
            default_top_k: 5,
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            log_dir: PathBuf::from("./logs"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, SemSearchError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let config = Self {
            corpus_path: Self::get_env_path("CORPUS_PATH").unwrap_or(defaults.corpus_path),
            text_key: std::env::var("TEXT_KEY").unwrap_or(defaults.text_key),
            ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            embed_batch_size: Self::get_env_parsed("EMBED_BATCH_SIZE")?
                .unwrap_or(defaults.embed_batch_size),
            default_top_k: Self::get_env_parsed("DEFAULT_TOP_K")?
                .unwrap_or(defaults.default_top_k),
            server_host: std::env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: Self::get_env_parsed("SERVER_PORT")?
                .unwrap_or(defaults.server_port),
            log_dir: Self::get_env_path("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
        };

        config.validate()?;

        Ok(config)
    }

    /// Get PathBuf from environment variable
    fn get_env_path(key: &str) -> Option<PathBuf> {
        std::env::var(key).ok().map(PathBuf::from)
    }

    /// Parse a numeric environment variable, failing loudly on garbage
    fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, SemSearchError> {
        match std::env::var(key) {
            Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
                SemSearchError::config(format!("{} must be a number, got '{}'", key, raw))
            }),
            Err(_) => Ok(None),
        }
    }

    /// Ensure required directories exist, create if not
    pub fn ensure_directories(&self) -> Result<(), SemSearchError> {
        if !self.log_dir.exists() {
            std::fs::create_dir_all(&self.log_dir).map_err(|e| {
                SemSearchError::config(format!(
                    "Failed to create directory {}: {}",
                    self.log_dir.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }

    /// Get log file path
    pub fn get_log_path(&self, filename: &str) -> PathBuf {
        self.log_dir.join(filename)
    }

    /// Get server bind address (host:port)
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), SemSearchError> {
        if self.text_key.is_empty() {
            return Err(SemSearchError::config("Text key cannot be empty"));
        }

        // Validate Ollama URL
        if !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://") {
            return Err(SemSearchError::config(
                "Ollama base URL must start with http:// or https://"
            ));
        }

        if self.embed_batch_size == 0 {
            return Err(SemSearchError::config("Embedding batch size must be at least 1"));
        }

        if self.default_top_k == 0 {
            return Err(SemSearchError::config("Default top_k must be at least 1"));
        }

        // Validate port range
        if self.server_port == 0 {
            return Err(SemSearchError::config("Server port cannot be 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.text_key, "text");
        assert_eq!(config.default_top_k, 5);
    }

    #[test]
    fn test_server_bind_address() {
        let config = AppConfig::default();
        assert_eq!(config.server_bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_validate() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        let mut invalid_config = AppConfig::default();
        invalid_config.text_key = String::new();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.ollama_base_url = "localhost:11434".to_string();
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.default_top_k = 0;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = AppConfig::default();
        invalid_config.embed_batch_size = 0;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_ensure_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.log_dir = tmp.path().join("nested").join("logs");

        config.ensure_directories().unwrap();
        assert!(config.log_dir.is_dir());
        assert_eq!(
            config.get_log_path("semsearch.log"),
            tmp.path().join("nested").join("logs").join("semsearch.log")
        );
    }
}
