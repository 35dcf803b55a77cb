//! Client configuration.
//!
//! Settings come from an optional TOML file in the platform config
//! directory, with environment variables taking precedence for the API
//! token and base URL. The token is assumed pre-provisioned; there is no
//! interactive authentication flow.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Public endpoint of the climate-data service.
pub const DEFAULT_BASE_URL: &str = "https://app.climate.azavea.com/api";

/// Environment variable overriding the API token.
pub const TOKEN_ENV: &str = "CLIMATA_API_TOKEN";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "CLIMATA_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API token configured; set {TOKEN_ENV} or add api_token to config.toml")]
    MissingToken,

    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Resolved client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Static bearer token sent as `Authorization: Token <value>`.
    pub api_token: String,

    /// Base URL of the climate-data service.
    pub base_url: String,

    /// Location of the SQLite response cache.
    pub cache_db: PathBuf,
}

/// On-disk shape of `config.toml`. Every field is optional; resolution
/// fills in env overrides and defaults.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_token: Option<String>,
    base_url: Option<String>,
    cache_db: Option<PathBuf>,
}

impl Config {
    /// Build a config with defaults for everything but the token.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_db: default_cache_db(),
        }
    }

    /// Load from `<config_dir>/climata/config.toml` (if present) and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = dirs::config_dir().map(|dir| dir.join("climata").join("config.toml"));
        Self::load_inner(path.as_deref())
    }

    /// Load from an explicit config file path, then apply environment
    /// overrides. A missing file is treated as empty.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_inner(Some(path))
    }

    fn load_inner(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(p) if p.exists() => toml::from_str(&fs::read_to_string(p)?)?,
            _ => FileConfig::default(),
        };

        Self::resolve(file, env::var(TOKEN_ENV).ok(), env::var(BASE_URL_ENV).ok())
    }

    /// Merge file values with env overrides (env wins) and validate.
    fn resolve(
        file: FileConfig,
        env_token: Option<String>,
        env_base_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let api_token = env_token
            .or(file.api_token)
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let base_url = env_base_url
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        validate_base_url(&base_url)?;

        let cache_db = file.cache_db.unwrap_or_else(default_cache_db);

        Ok(Self { api_token, base_url, cache_db })
    }
}

fn default_cache_db() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("climata")
        .join("cache.db")
}

fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_env_token_wins_over_file() {
        let file = FileConfig {
            api_token: Some("from-file".to_string()),
            base_url: None,
            cache_db: None,
        };

        let config =
            Config::resolve(file, Some("from-env".to_string()), None).unwrap();

        assert_eq!(config.api_token, "from-env");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_file_token_used_without_env() {
        let file = FileConfig {
            api_token: Some("from-file".to_string()),
            base_url: None,
            cache_db: None,
        };

        let config = Config::resolve(file, None, None).unwrap();

        assert_eq!(config.api_token, "from-file");
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let result = Config::resolve(FileConfig::default(), None, None);
        assert!(matches!(result, Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_empty_token_is_an_error() {
        let result = Config::resolve(FileConfig::default(), Some(String::new()), None);
        assert!(matches!(result, Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = Config::resolve(
            FileConfig::default(),
            Some("token".to_string()),
            Some("not a url".to_string()),
        );
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let result = Config::resolve(
            FileConfig::default(),
            Some("token".to_string()),
            Some("ftp://example.com/api".to_string()),
        );
        assert!(matches!(result, Err(ConfigError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            api_token = "file-token"
            base_url = "http://localhost:9000/api"
            cache_db = "/tmp/climata-test/cache.db"
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.base_url, "http://localhost:9000/api");
        assert_eq!(config.cache_db, PathBuf::from("/tmp/climata-test/cache.db"));
    }

    #[test]
    fn test_load_from_missing_file_without_token_errors() {
        // Only meaningful when the env override is unset, which is the
        // normal test environment.
        if env::var(TOKEN_ENV).is_ok() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from(&dir.path().join("nope.toml"));
        assert!(matches!(result, Err(ConfigError::MissingToken)));
    }

    #[test]
    fn test_new_fills_defaults() {
        let config = Config::new("token");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.cache_db.ends_with("climata/cache.db"));
    }
}
