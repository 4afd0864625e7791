//! Configuration management for enlink
//!
//! Loads the TOML configuration, applies `ENLINK_*` environment overrides
//! and validates the result. Runtime components receive typed settings
//! derived from it (`RetryConfig`, `ResolverSettings`) instead of reading
//! any global state.

use crate::entities::LabelSet;
use crate::error::{EnlinkError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod validator;

pub use validator::ConfigValidator;

pub const SCHEMA_VERSION: &str = "1.0.0";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub retry: RetryFileConfig,
    pub resolver: ResolverConfig,
    pub extractor: ExtractorConfig,
    pub enrichment: EnrichmentConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Retry policy for resolver calls, as written in the file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryFileConfig {
    pub max_attempts: u32,
    pub base_delay: String,
    pub max_delay: String,
}

/// Reference resolver (knowledge base search) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub request_timeout: String,
    pub max_concurrent: usize,
}

/// Entity extractor (hosted chat model) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    pub endpoint: String,
    pub api_key_env: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout: String,
}

/// Enrichment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Categories whose mentions get linked
    pub whitelist: LabelSet,
}

/// Typed retry settings handed to the resolver retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Typed resolver settings
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub endpoint: String,
    pub user_agent: String,
    pub request_timeout: Duration,
    pub max_concurrent: usize,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(EnlinkError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| EnlinkError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_env_overrides();

        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| EnlinkError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: ENLINK_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("ENLINK_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    /// Apply a single `SECTION__KEY` override
    pub fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "RETRY__MAX_ATTEMPTS" => {
                self.retry.max_attempts = parse_value(path, value)?;
            }
            "RETRY__BASE_DELAY" => {
                self.retry.base_delay = value.to_string();
            }
            "RETRY__MAX_DELAY" => {
                self.retry.max_delay = value.to_string();
            }
            "RESOLVER__ENDPOINT" => {
                self.resolver.endpoint = value.to_string();
            }
            "RESOLVER__MAX_CONCURRENT" => {
                self.resolver.max_concurrent = parse_value(path, value)?;
            }
            "EXTRACTOR__ENDPOINT" => {
                self.extractor.endpoint = value.to_string();
            }
            "EXTRACTOR__MODEL" => {
                self.extractor.model = value.to_string();
            }
            "EXTRACTOR__TEMPERATURE" => {
                self.extractor.temperature = parse_value(path, value)?;
            }
            "ENRICHMENT__WHITELIST" => {
                self.enrichment.whitelist =
                    LabelSet::parse_list(value).map_err(|e| EnlinkError::InvalidConfigValue {
                        path: path.to_string(),
                        message: e.to_string(),
                    })?;
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Typed retry settings
    pub fn retry_config(&self) -> Result<RetryConfig> {
        Ok(RetryConfig {
            max_attempts: self.retry.max_attempts,
            base_delay: duration_at("retry.base_delay", &self.retry.base_delay)?,
            max_delay: duration_at("retry.max_delay", &self.retry.max_delay)?,
        })
    }

    /// Typed resolver settings
    pub fn resolver_settings(&self) -> Result<ResolverSettings> {
        Ok(ResolverSettings {
            endpoint: self.resolver.endpoint.clone(),
            user_agent: self.resolver.user_agent.clone(),
            request_timeout: duration_at(
                "resolver.request_timeout",
                &self.resolver.request_timeout,
            )?,
            max_concurrent: self.resolver.max_concurrent,
        })
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EnlinkError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("enlink").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            retry: RetryFileConfig {
                max_attempts: 5,
                base_delay: "1s".to_string(),
                max_delay: "10s".to_string(),
            },
            resolver: ResolverConfig {
                endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
                user_agent: concat!("enlink/", env!("CARGO_PKG_VERSION"), " (entity link enrichment)")
                    .to_string(),
                request_timeout: "10s".to_string(),
                max_concurrent: 4,
            },
            extractor: ExtractorConfig {
                endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                model: "gpt-4o-mini".to_string(),
                temperature: 0.0,
                request_timeout: "60s".to_string(),
            },
            enrichment: EnrichmentConfig {
                whitelist: LabelSet::LINKABLE,
            },
        }
    }
}

/// Parse a duration string: `250ms`, `5s`, `2m`, or bare seconds
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    let (digits, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => s.split_at(idx),
        None => (s, "s"),
    };

    if digits.is_empty() {
        return Err(format!("Invalid duration format: '{}'", s));
    }
    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("Invalid duration amount: '{}'", s))?;

    match unit {
        "ms" => Ok(Duration::from_millis(amount)),
        "s" => Ok(Duration::from_secs(amount)),
        "m" => Ok(Duration::from_secs(amount.saturating_mul(60))),
        _ => Err(format!("Invalid duration unit in '{}' (use ms, s or m)", s)),
    }
}

fn duration_at(path: &str, value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|message| EnlinkError::InvalidConfigValue {
        path: path.to_string(),
        message,
    })
}

fn parse_value<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| EnlinkError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}'", value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("5s"), Ok(Duration::from_secs(5)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("7"), Ok(Duration::from_secs(7)));
        assert!(parse_duration("").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("5h").is_err());
        assert!(parse_duration("1.5s").is_err());
    }

    #[test]
    fn test_default_retry_config() {
        let config = Config::default();
        assert_eq!(config.retry_config().unwrap(), RetryConfig::default());
    }

    #[test]
    fn test_env_override_values() {
        let mut config = Config::default();
        config.set_value_from_env("RETRY__MAX_ATTEMPTS", "3").unwrap();
        config.set_value_from_env("EXTRACTOR__MODEL", "gpt-4o").unwrap();
        config
            .set_value_from_env("ENRICHMENT__WHITELIST", "person,org")
            .unwrap();

        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.extractor.model, "gpt-4o");
        assert_eq!(config.enrichment.whitelist.len(), 2);

        assert!(config
            .set_value_from_env("RETRY__MAX_ATTEMPTS", "many")
            .is_err());
        assert!(config
            .set_value_from_env("ENRICHMENT__WHITELIST", "planet")
            .is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("whitelist = ["));

        let back: Config = toml::from_str(&toml).unwrap();
        assert_eq!(back.enrichment.whitelist, LabelSet::LINKABLE);
        assert_eq!(back.resolver.max_concurrent, 4);
    }
}
