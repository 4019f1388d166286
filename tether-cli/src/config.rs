//! # Environment-Based Configuration
//!
//! ## Environment Variables
//!
//! ### Capability provider
//! - `TETHER_MCP_COMMAND` - Program that starts the MCP server (default: `node`)
//! - `TETHER_MCP_ARGS` - Whitespace separated arguments (default: `mcp-server/index.js`)
//! - `TETHER_MCP_TIMEOUT_SECS` - Handshake timeout in seconds (default: 30)
//!
//! ### Conversation
//! - `TETHER_STATE_FILE` - Conversation document path
//!   (default: `<data dir>/tether/conversation-state.json`)
//! - `TETHER_MAX_ITERATIONS` - Model rounds per turn (default: 5)
//! - `TETHER_ASK_TIMEOUT_SECS` - Deadline for `tether ask` (default: 60)
//!
//! ### Model
//! - `OLLAMA_BASE_URL` - Ollama endpoint (default: `http://localhost:11434`)
//! - `OLLAMA_MODEL` - Model name (default: `llama3.1`)
//! - `TETHER_TEMPERATURE` - Sampling temperature (default: 0.7)
//!
//! ### Logging
//! - `TETHER_LOG_JSON` - Emit JSON logs (default: false)

use std::{env, path::PathBuf, time::Duration};

use tether_agent::{AgentConfig, DEFAULT_MAX_ITERATIONS};
use tether_mcp::McpServerConfig;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Validated settings for the `tether` binary.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    pub mcp_command: String,
    pub mcp_args: Vec<String>,
    pub mcp_timeout_secs: u64,
    pub state_file: PathBuf,
    pub max_iterations: usize,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub temperature: f64,
    pub ask_timeout_secs: u64,
    pub log_json: bool,
}

impl CliConfig {
    pub fn mcp_server(&self) -> McpServerConfig {
        McpServerConfig::new(&self.mcp_command)
            .with_args(&self.mcp_args)
            .with_handshake_timeout(Duration::from_secs(self.mcp_timeout_secs))
    }

    pub fn agent(&self) -> AgentConfig {
        AgentConfig::default().with_max_iterations(self.max_iterations)
    }

    pub fn ask_timeout(&self) -> Duration {
        Duration::from_secs(self.ask_timeout_secs)
    }
}

/// Builder for [`CliConfig`] with environment variable support
#[derive(Debug, Clone)]
pub struct CliConfigBuilder {
    mcp_command: String,
    mcp_args: Vec<String>,
    mcp_timeout_secs: u64,
    state_file: Option<PathBuf>,
    max_iterations: usize,
    ollama_base_url: String,
    ollama_model: String,
    temperature: f64,
    ask_timeout_secs: u64,
    log_json: bool,
}

impl Default for CliConfigBuilder {
    fn default() -> Self {
        Self {
            mcp_command: "node".to_string(),
            mcp_args: vec!["mcp-server/index.js".to_string()],
            mcp_timeout_secs: 30,
            state_file: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.1".to_string(),
            temperature: 0.7,
            ask_timeout_secs: 60,
            log_json: false,
        }
    }
}

impl CliConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any variable has an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut builder = Self::default();

        if let Some(command) = lookup("TETHER_MCP_COMMAND") {
            builder = builder.mcp_command(command);
        }
        if let Some(args) = lookup("TETHER_MCP_ARGS") {
            builder = builder.mcp_args(args.split_whitespace().map(str::to_string).collect());
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "TETHER_MCP_TIMEOUT_SECS")? {
            builder = builder.mcp_timeout_secs(secs);
        }
        if let Some(path) = lookup("TETHER_STATE_FILE") {
            builder = builder.state_file(PathBuf::from(path));
        }
        if let Some(max) = parse_var::<usize>(&lookup, "TETHER_MAX_ITERATIONS")? {
            builder = builder.max_iterations(max);
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            builder = builder.ollama_base_url(url);
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            builder = builder.ollama_model(model);
        }
        if let Some(temperature) = parse_var::<f64>(&lookup, "TETHER_TEMPERATURE")? {
            builder = builder.temperature(temperature);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "TETHER_ASK_TIMEOUT_SECS")? {
            builder = builder.ask_timeout_secs(secs);
        }
        if let Some(json) = parse_bool(&lookup, "TETHER_LOG_JSON")? {
            builder = builder.log_json(json);
        }

        Ok(builder)
    }

    #[must_use]
    pub fn mcp_command(mut self, command: impl Into<String>) -> Self {
        self.mcp_command = command.into();
        self
    }

    #[must_use]
    pub fn mcp_args(mut self, args: Vec<String>) -> Self {
        self.mcp_args = args;
        self
    }

    #[must_use]
    pub fn mcp_timeout_secs(mut self, secs: u64) -> Self {
        self.mcp_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn state_file(mut self, path: PathBuf) -> Self {
        self.state_file = Some(path);
        self
    }

    #[must_use]
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    #[must_use]
    pub fn ollama_base_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_base_url = url.into();
        self
    }

    #[must_use]
    pub fn ollama_model(mut self, model: impl Into<String>) -> Self {
        self.ollama_model = model.into();
        self
    }

    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn ask_timeout_secs(mut self, secs: u64) -> Self {
        self.ask_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn log_json(mut self, json: bool) -> Self {
        self.log_json = json;
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` when a value is out of range.
    pub fn build(self) -> Result<CliConfig, ConfigError> {
        self.validate()?;

        let state_file = self.state_file.unwrap_or_else(default_state_file);
        Ok(CliConfig {
            mcp_command: self.mcp_command,
            mcp_args: self.mcp_args,
            mcp_timeout_secs: self.mcp_timeout_secs,
            state_file,
            max_iterations: self.max_iterations,
            ollama_base_url: self.ollama_base_url.trim_end_matches('/').to_string(),
            ollama_model: self.ollama_model,
            temperature: self.temperature,
            ask_timeout_secs: self.ask_timeout_secs,
            log_json: self.log_json,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.mcp_command.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "mcp_command cannot be empty".to_string(),
            ));
        }
        if self.mcp_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "mcp_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        if self.ask_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "ask_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.ollama_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ollama_model cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_state_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tether")
        .join("conversation-state.json")
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid value '{val}': {e}"),
            }),
        None => Ok(None),
    }
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<bool>, ConfigError> {
    match lookup(key) {
        Some(val) => match val.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!(
                    "invalid boolean value '{val}', expected true/false/1/0/yes/no/on/off"
                ),
            }),
        },
        None => Ok(None),
    }
}
