//! Relay configuration.
//!
//! Tunables come from an optional `relay.toml`; secrets come from the
//! environment only. Environment values override file values. The process
//! must not serve traffic unless all required secrets are present.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use assistant_module::AssistantConfig;

use crate::adapters::line;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9300;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnv(&'static str),
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default)]
pub struct RelayConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub assistant: AssistantSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AssistantSection {
    pub poll_attempts: Option<u32>,
    pub poll_interval_secs: Option<u64>,
}

/// Resolved configuration, built once at process start.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub assistant_id: String,
    pub line_channel_access_token: String,
    /// Webhook signature verification is skipped when absent.
    pub line_channel_secret: Option<String>,
    pub line_api_base: String,
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    pub max_body_bytes: usize,
}

impl RelayConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let file = match resolve_config_path() {
            Some(path) => load_config_file(&path)?,
            None => RelayConfigFile::default(),
        };
        Self::from_sources(&file)
    }

    fn from_sources(file: &RelayConfigFile) -> Result<Self, ConfigError> {
        let openai_api_key = require_env("OPENAI_API_KEY")?;
        let assistant_id = require_env("OPENAI_ASSISTANT_ID")?;
        let line_channel_access_token = require_env("LINE_CHANNEL_ACCESS_TOKEN")?;

        let host = env_non_empty("GATEWAY_HOST")
            .or_else(|| file.server.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = env::var("GATEWAY_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .or(file.server.port)
            .unwrap_or(DEFAULT_PORT);

        let poll_attempts = env::var("ASSISTANT_POLL_ATTEMPTS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|value| *value > 0)
            .or(file.assistant.poll_attempts)
            .unwrap_or(assistant_module::config::DEFAULT_POLL_ATTEMPTS);
        let poll_interval = env::var("ASSISTANT_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .map(Duration::from_secs)
            .or(file
                .assistant
                .poll_interval_secs
                .map(Duration::from_secs))
            .unwrap_or(assistant_module::config::DEFAULT_POLL_INTERVAL);

        let max_body_bytes = env::var("GATEWAY_MAX_BODY_BYTES")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        Ok(Self {
            host,
            port,
            openai_api_key,
            openai_api_base: env_non_empty("OPENAI_API_BASE_URL")
                .unwrap_or_else(|| assistant_module::config::DEFAULT_API_BASE.to_string()),
            assistant_id,
            line_channel_access_token,
            line_channel_secret: env_non_empty("LINE_CHANNEL_SECRET"),
            line_api_base: env_non_empty("LINE_API_BASE_URL")
                .unwrap_or_else(|| line::DEFAULT_API_BASE.to_string()),
            poll_attempts,
            poll_interval,
            max_body_bytes,
        })
    }

    /// Settings for the assistant client, carved out of the relay config.
    pub fn assistant_config(&self) -> AssistantConfig {
        let mut config = AssistantConfig::new(
            self.openai_api_key.clone(),
            self.assistant_id.clone(),
        );
        config.api_base = self.openai_api_base.clone();
        config.poll_attempts = self.poll_attempts;
        config.poll_interval = self.poll_interval;
        config
    }
}

fn resolve_config_path() -> Option<PathBuf> {
    if let Some(path) = env_non_empty("RELAY_CONFIG_PATH") {
        return Some(PathBuf::from(path));
    }

    let cwd = env::current_dir().ok()?;
    let direct = cwd.join("relay.toml");
    direct.exists().then_some(direct)
}

fn load_config_file(path: &Path) -> Result<RelayConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str::<RelayConfigFile>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn require_env(key: &'static str) -> Result<String, ConfigError> {
    env_non_empty(key).ok_or(ConfigError::MissingEnv(key))
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
