use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

pub const PRACTICUM_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Secrets read from the environment at startup.
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("practicum_token", &"<redacted>")
            .field("telegram_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from an arbitrary variable lookup.
    /// Empty values are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingCredential(name))
        };

        Ok(Self {
            practicum_token: require(PRACTICUM_TOKEN_VAR)?,
            telegram_token: require(TELEGRAM_TOKEN_VAR)?,
            telegram_chat_id: require(TELEGRAM_CHAT_ID_VAR)?,
        })
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PracticumConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl PracticumConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct PollingConfig {
    #[serde(default = "default_retry_period_secs")]
    pub retry_period_secs: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_practicum_config")]
    pub practicum: PracticumConfig,
    #[serde(default = "default_polling_config")]
    pub polling: PollingConfig,
}

fn default_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_retry_period_secs() -> u64 {
    600
}

fn default_practicum_config() -> PracticumConfig {
    PracticumConfig {
        endpoint: default_endpoint(),
        request_timeout_secs: default_request_timeout_secs(),
    }
}

fn default_polling_config() -> PollingConfig {
    PollingConfig {
        retry_period_secs: default_retry_period_secs(),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            practicum: default_practicum_config(),
            polling: default_polling_config(),
        }
    }
}

impl Config {
    /// Delay between the end of one poll cycle and the start of the next.
    pub fn retry_period(&self) -> Duration {
        Duration::from_secs(self.polling.retry_period_secs)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load from an explicitly given path, or from `config.toml` if it exists.
    /// Without either, every setting takes its default.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            let config = Self::load(&path)?;
            return Ok((config, Some(path)));
        }

        let fallback = PathBuf::from(DEFAULT_CONFIG_PATH);
        if fallback.exists() {
            let config = Self::load(&fallback)?;
            Ok((config, Some(fallback)))
        } else {
            Ok((Self::default(), None))
        }
    }
}
