//! Application configuration loaded from environment variables.
//!
//! The backend URL and anon key identify the managed backend project. The
//! generative-text API key is optional; when it is absent the message
//! composer falls back to a deterministic template.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the managed backend project (auth + REST row API)
    pub backend_url: String,
    /// Publishable anon key sent with every backend request
    pub backend_anon_key: String,
    /// Generative-text API key; `None` disables drafting and uses the fallback
    pub genai_api_key: Option<String>,
    /// Generative-text model name
    pub genai_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            backend_url: env::var("BACKEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("BACKEND_URL"))?,
            backend_anon_key: env::var("BACKEND_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("BACKEND_ANON_KEY"))?,
            genai_api_key: env::var("GENAI_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            genai_model: env::var("GENAI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            backend_url: "http://localhost:54321".to_string(),
            backend_anon_key: "test_anon_key".to_string(),
            genai_api_key: None,
            genai_model: "gemini-2.5-flash".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("BACKEND_URL", "http://localhost:54321/");
        env::set_var("BACKEND_ANON_KEY", " test_anon ");
        env::remove_var("GENAI_API_KEY");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.backend_url, "http://localhost:54321");
        assert_eq!(config.backend_anon_key, "test_anon");
        assert!(config.genai_api_key.is_none());
        assert_eq!(config.genai_model, "gemini-2.5-flash");

        // A blank key counts as absent
        env::set_var("GENAI_API_KEY", "   ");
        let config = Config::from_env().expect("Config should load");
        assert!(config.genai_api_key.is_none());
        env::remove_var("GENAI_API_KEY");
    }
}
