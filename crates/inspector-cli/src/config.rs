//! CLI configuration
//!
//! Values come from an optional JSON file and are then overridden by
//! command-line flags.

use crate::CliError;
use inspector_capabilities::Platform;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Overrides the detected platform
    pub platform: Option<Platform>,
    /// Attach the demo algorithm as the live object
    pub live_object: bool,
    pub output: OutputFormat,
    /// `tracing` filter directive, e.g. `inspector_eval=debug`
    pub log_filter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: None,
            live_object: true,
            output: OutputFormat::Text,
            log_filter: None,
        }
    }
}

impl Config {
    /// Load from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| CliError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }
}
