use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub appdir: Option<String>,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

/// How to launch the external recommendation engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default = "default_command")]
    pub command: String,
    /// Arguments placed before the per-request flags, e.g. the script path.
    #[serde(default = "default_engine_args")]
    pub args: Vec<String>,
    #[serde(default)]
    pub workdir: Option<String>,
    /// Seconds before a running engine is killed.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(alias = "defaultlimit", default = "default_limit")]
    pub default_limit: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_engine_args(),
            workdir: None,
            timeout: default_timeout(),
            default_limit: default_limit(),
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DemoConfig {
    #[serde(default)]
    pub catalog: Option<String>,
    #[serde(alias = "preferengine", default)]
    pub prefer_engine: bool,
}

fn default_port() -> String {
    "3000".to_string()
}

fn default_command() -> String {
    "python3".to_string()
}

fn default_engine_args() -> Vec<String> {
    vec![PathBuf::from("python")
        .join("api_handler.py")
        .to_string_lossy()
        .to_string()]
}

fn default_timeout() -> u64 {
    30
}

fn default_limit() -> u32 {
    10
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(path, &content)
    }

    fn from_yaml(path: &str, content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.command.trim().is_empty() {
            return Err(ConfigError::Invalid("engine.command must not be empty".to_string()));
        }
        if self.engine.timeout == 0 {
            return Err(ConfigError::Invalid("engine.timeout must be at least 1 second".to_string()));
        }
        if self.listen.tlscert.is_some() != self.listen.tlskey.is_some() {
            return Err(ConfigError::Invalid(
                "listen.tlscert and listen.tlskey must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
