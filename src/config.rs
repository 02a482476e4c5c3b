//! Run configuration: defaults, an optional TOML file, then environment.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos. Environment variables always win over the file.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
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

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value for {var}: {value:?} is not an integer")]
    InvalidNumber { var: &'static str, value: String },
}

// ============================================================================
// Environment Variables
// ============================================================================

pub const ENV_FEED_URL: &str = "BLOG_FEED_URL";
pub const ENV_POST_LIMIT: &str = "BLOG_POST_LIMIT";
pub const ENV_LANGUAGE: &str = "BLOG_LANGUAGE";
pub const ENV_REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT";

pub const DEFAULT_FEED_URL: &str = "https://www.7fl.org/feed.xml";

// ============================================================================
// Configuration Struct
// ============================================================================

/// Settings for one run.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed location: http(s) URL, `file://` URL or local path. Empty disables fetching.
    pub feed_url: String,

    /// Maximum number of posts in the generated block. Negative values drop
    /// that many posts from the end of the selection instead.
    pub post_limit: i64,

    /// Language filter; only `zh` filters anything.
    pub language: String,

    /// Timeout for the fallback request, in seconds.
    pub request_timeout_secs: u64,

    /// Name of the README region to rewrite.
    pub marker: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            post_limit: 6,
            language: "zh".to_string(),
            request_timeout_secs: 20,
            marker: "blog".to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "feed_url",
        "post_limit",
        "language",
        "request_timeout_secs",
        "marker",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
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

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        config.normalize();
        tracing::debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Overrides fields from the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|var| std::env::var(var).ok())
    }

    /// Overrides fields from `lookup`, which maps a variable name to its value.
    ///
    /// `BLOG_FEED_URL` and `BLOG_LANGUAGE` are trimmed (the language is also
    /// lowercased). The two integers must parse or the whole load fails.
    pub fn apply_env_with<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_FEED_URL) {
            self.feed_url = url;
        }
        if let Some(limit) = lookup(ENV_POST_LIMIT) {
            self.post_limit = parse_number(ENV_POST_LIMIT, &limit)?;
        }
        if let Some(language) = lookup(ENV_LANGUAGE) {
            self.language = language;
        }
        if let Some(timeout) = lookup(ENV_REQUEST_TIMEOUT) {
            self.request_timeout_secs = parse_number(ENV_REQUEST_TIMEOUT, &timeout)?;
        }
        self.normalize();
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn normalize(&mut self) {
        self.feed_url = self.feed_url.trim().to_string();
        self.language = self.language.trim().to_lowercase();
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.feed_url, "https://www.7fl.org/feed.xml");
        assert_eq!(config.post_limit, 6);
        assert_eq!(config.language, "zh");
        assert_eq!(config.request_timeout(), Duration::from_secs(20));
        assert_eq!(config.marker, "blog");
    }

    #[test]
    fn test_empty_env_keeps_defaults() {
        let config = Config::default().apply_env_with(env(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .apply_env_with(env(&[
                (ENV_FEED_URL, "  https://example.com/atom.xml\n"),
                (ENV_POST_LIMIT, "3"),
                (ENV_LANGUAGE, " EN "),
                (ENV_REQUEST_TIMEOUT, "5"),
            ]))
            .unwrap();
        assert_eq!(config.feed_url, "https://example.com/atom.xml");
        assert_eq!(config.post_limit, 3);
        assert_eq!(config.language, "en");
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_empty_feed_url_from_env() {
        let config = Config::default()
            .apply_env_with(env(&[(ENV_FEED_URL, "   ")]))
            .unwrap();
        assert_eq!(config.feed_url, "");
    }

    #[test]
    fn test_invalid_limit_is_error() {
        let err = Config::default()
            .apply_env_with(env(&[(ENV_POST_LIMIT, "six")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber { var: ENV_POST_LIMIT, .. }
        ));
        assert!(err.to_string().contains("BLOG_POST_LIMIT"));
    }

    #[test]
    fn test_negative_limit_is_accepted() {
        let config = Config::default()
            .apply_env_with(env(&[(ENV_POST_LIMIT, "-1")]))
            .unwrap();
        assert_eq!(config.post_limit, -1);
    }

    #[test]
    fn test_negative_timeout_is_error() {
        let result = Config::default().apply_env_with(env(&[(ENV_REQUEST_TIMEOUT, "-1")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/readme_feed_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let dir = std::env::temp_dir().join("readme_feed_config_test_whitespace");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "   \n  \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing() {
        let dir = std::env::temp_dir().join("readme_feed_config_test_partial");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "post_limit = 10\nlanguage = \"ZH\"\nunknown_key = 1\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.post_limit, 10);
        assert_eq!(config.language, "zh");
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.marker, "blog");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_wins_over_file() {
        let dir = std::env::temp_dir().join("readme_feed_config_test_layering");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "post_limit = 10\nmarker = \"posts\"\n").unwrap();

        let config = Config::load(&path)
            .unwrap()
            .apply_env_with(env(&[(ENV_POST_LIMIT, "2")]))
            .unwrap();
        assert_eq!(config.post_limit, 2);
        assert_eq!(config.marker, "posts");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = std::env::temp_dir().join("readme_feed_config_test_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("readme_feed_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));

        std::fs::remove_dir_all(&dir).ok();
    }
}
