//! Configuration file parser for newsdesk.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde, though we log a warning when
//! the file contains potential typos. API keys may also arrive via the
//! `NEWSCATCHER_API_KEY` / `OPENAI_API_KEY` environment variables, which
//! take precedence over the file.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
///
/// A custom `Debug` impl masks both API keys so they never leak into logs
/// or error output.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub bind: String,

    /// Path to the SQLite database file.
    pub database_path: String,

    /// News-search API key (alternative to NEWSCATCHER_API_KEY env var).
    pub news_api_key: Option<String>,

    /// Override for the news-search API base URL. Intended for tests and
    /// self-hosted proxies; HTTPS is required except for localhost.
    pub news_base_url: Option<String>,

    /// LLM API key for article summaries (alternative to OPENAI_API_KEY
    /// env var). Summaries are disabled when absent.
    pub openai_api_key: Option<String>,

    /// Override for the LLM API base URL.
    pub openai_base_url: Option<String>,

    /// Bearer-token lifetime in hours.
    pub token_ttl_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            database_path: "newsdesk.db".to_string(),
            news_api_key: None,
            news_base_url: None,
            openai_api_key: None,
            openai_base_url: None,
            token_ttl_hours: 24 * 30,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind", &self.bind)
            .field("database_path", &self.database_path)
            .field(
                "news_api_key",
                &self.news_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("news_base_url", &self.news_base_url)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB). Anything larger is rejected before
    /// it is read into memory.
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    ///
    /// After parsing, `NEWSCATCHER_API_KEY` and `OPENAI_API_KEY` from the
    /// environment override the file's values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_file(path)?;

        if let Ok(key) = std::env::var("NEWSCATCHER_API_KEY") {
            config.news_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.openai_api_key = Some(key);
        }

        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read.
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to flag likely typos.
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "bind",
                "database_path",
                "news_api_key",
                "news_base_url",
                "openai_api_key",
                "openai_base_url",
                "token_ttl_hours",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), bind = %config.bind, "Loaded configuration");
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.database_path, "newsdesk.db");
        assert!(config.news_api_key.is_none());
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.token_ttl_hours, 720);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/newsdesk_test_nonexistent_config.toml");
        let config = Config::load_file(path).unwrap();
        assert_eq!(config.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("newsdesk.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.database_path, "newsdesk.db");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("newsdesk.toml");
        std::fs::write(&path, "bind = \"0.0.0.0:9000\"\n").unwrap();

        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.database_path, "newsdesk.db"); // default
        assert_eq!(config.token_ttl_hours, 720); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("newsdesk.toml");

        let content = r#"
bind = "0.0.0.0:3000"
database_path = "/var/lib/newsdesk/news.db"
news_api_key = "nc-test-key"
news_base_url = "https://news.internal.example.com"
openai_api_key = "sk-test-key"
token_ttl_hours = 48
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.bind, "0.0.0.0:3000");
        assert_eq!(config.database_path, "/var/lib/newsdesk/news.db");
        assert_eq!(config.news_api_key.as_deref(), Some("nc-test-key"));
        assert_eq!(
            config.news_base_url.as_deref(),
            Some("https://news.internal.example.com")
        );
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test-key"));
        assert_eq!(config.token_ttl_hours, 48);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("newsdesk.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_unknown");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("newsdesk.toml");
        std::fs::write(&path, "bind = \"127.0.0.1:8080\"\ntotally_fake_key = 1\n").unwrap();

        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.bind, "127.0.0.1:8080");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_wrongtype");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("newsdesk.toml");
        std::fs::write(&path, "token_ttl_hours = \"lots\"\n").unwrap();

        assert!(Config::load_file(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("newsdesk_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("newsdesk.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let result = Config::load_file(&path);
        assert!(matches!(result, Err(ConfigError::TooLarge(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_debug_masks_api_keys() {
        let config = Config {
            news_api_key: Some("nc-super-secret".to_string()),
            openai_api_key: Some("sk-super-secret".to_string()),
            ..Config::default()
        };

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
