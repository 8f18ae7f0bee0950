// Runtime configuration: one TOML file, read once at startup, with secrets
// optionally supplied through the environment (or a `.env` file).

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::models::QuantityMapping;

pub const ENV_CONFIG_PATH: &str = "SIGNAL_BRIDGE_CONFIG";
pub const ENV_BINANCE_API_KEY: &str = "BINANCE_API_KEY";
pub const ENV_BINANCE_SECRET_KEY: &str = "BINANCE_SECRET_KEY";
pub const ENV_REDIS_PASSWORD: &str = "REDIS_PASSWORD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Binance API key and secret must both be set")]
    MissingCredentials,
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub redis: RedisConfig,
    /// May be left out entirely when the credentials come from the environment.
    #[serde(default)]
    pub binance: BinanceConfig,
    #[serde(default)]
    pub listener: ListenerConfig,
    #[serde(default)]
    pub quantity_mapping: QuantityMapping,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
    /// Pub/sub channel the signals are published on.
    pub channel: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            channel: "okx:trading:signals".to_string(),
        }
    }
}

impl fmt::Debug for RedisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("db", &self.db)
            .field("channel", &self.channel)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct BinanceConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default = "default_leverage")]
    pub leverage: u32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_recv_window_ms")]
    pub recv_window_ms: u64,
    #[serde(default = "default_order_timeout_secs")]
    pub order_timeout_secs: u64,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            secret_key: String::new(),
            leverage: default_leverage(),
            base_url: default_base_url(),
            recv_window_ms: default_recv_window_ms(),
            order_timeout_secs: default_order_timeout_secs(),
        }
    }
}

impl BinanceConfig {
    pub fn order_timeout(&self) -> Duration {
        Duration::from_secs(self.order_timeout_secs)
    }
}

impl fmt::Debug for BinanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinanceConfig")
            .field("api_key", &mask(&self.api_key))
            .field("secret_key", &"***")
            .field("leverage", &self.leverage)
            .field("base_url", &self.base_url)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("order_timeout_secs", &self.order_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Pause before re-subscribing after the channel connection drops.
    pub reconnect_delay_secs: u64,
    /// Pause after an event that could not be processed at all.
    pub error_delay_secs: u64,
}

impl ListenerConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_delay_secs)
    }

    pub fn error_delay(&self) -> Duration {
        Duration::from_secs(self.error_delay_secs)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            reconnect_delay_secs: 5,
            error_delay_secs: 1,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_leverage() -> u32 {
    150
}

fn default_base_url() -> String {
    "https://fapi.binance.com".to_string()
}

fn default_recv_window_ms() -> u64 {
    5000
}

fn default_order_timeout_secs() -> u64 {
    10
}

fn mask(value: &str) -> String {
    match value.char_indices().nth(4) {
        Some((idx, _)) => format!("{}***", &value[..idx]),
        None => "***".to_string(),
    }
}

impl Config {
    /// Read, apply environment overrides and validate. This is the only way
    /// the binary builds its configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Secrets from the environment take precedence over the file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_BINANCE_API_KEY) {
            self.binance.api_key = key;
        }
        if let Some(secret) = non_empty(ENV_BINANCE_SECRET_KEY) {
            self.binance.secret_key = secret;
        }
        if let Some(password) = non_empty(ENV_REDIS_PASSWORD) {
            self.redis.password = Some(password);
        }
        if self.redis.password.as_deref().is_some_and(|p| p.is_empty()) {
            self.redis.password = None;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.binance.api_key.trim().is_empty() || self.binance.secret_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        if self.binance.leverage == 0 {
            return Err(ConfigError::Invalid {
                field: "binance.leverage",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.redis.channel.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "redis.channel",
                reason: "must not be empty".to_string(),
            });
        }
        if self.binance.order_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "binance.order_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
