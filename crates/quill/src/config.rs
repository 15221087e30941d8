// File: src/config.rs
// Purpose: Configuration parsing from quill.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub dispatch: DispatchConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Conventional parameter and attribute names used while dispatching
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DispatchConfig {
    /// Request parameter naming the action when the URI has none (default: "_action")
    #[serde(default = "default_action_parameter")]
    pub action_parameter: String,

    /// Request parameter holding the id when the URI has none (default: "id")
    #[serde(default = "default_id_parameter")]
    pub id_parameter: String,

    /// Flash key the chain model is carried under (default: "chainModel")
    #[serde(default = "default_chain_model_key")]
    pub chain_model_key: String,

    /// Request attribute the action's errors are copied to (default: "errors")
    #[serde(default = "default_errors_attribute")]
    pub errors_attribute: String,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingConfig {
    /// Whether routes are case-insensitive (default: false)
    #[serde(default = "default_false")]
    pub case_insensitive: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive (default: "info")
    #[serde(default = "default_filter")]
    pub filter: String,
}

// Default values
fn default_action_parameter() -> String {
    "_action".to_string()
}

fn default_id_parameter() -> String {
    "id".to_string()
}

fn default_chain_model_key() -> String {
    "chainModel".to_string()
}

fn default_errors_attribute() -> String {
    "errors".to_string()
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}

// Default implementations
impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            action_parameter: default_action_parameter(),
            id_parameter: default_id_parameter(),
            chain_model_key: default_chain_model_key(),
            errors_attribute: default_errors_attribute(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            case_insensitive: default_false(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl Config {
    /// Load configuration from quill.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(content).context("Invalid quill configuration")?;
        Ok(config)
    }

    /// Load configuration from default path (./quill.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("quill.toml")
    }
}
