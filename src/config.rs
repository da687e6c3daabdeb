// Configuration file handling

use crate::client::ItemAttribute;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub reporter: ReporterOptions,

    #[serde(default)]
    pub attachments: AttachmentConfig,
}

/// Options forwarded verbatim into the launch descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReporterOptions {
    /// Reporting service API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Project the launch belongs to
    #[serde(default = "default_project")]
    pub project: String,

    /// Authorization token
    #[serde(default)]
    pub token: Option<String>,

    /// Launch name
    #[serde(default = "default_launch")]
    pub launch: String,

    /// Launch description
    #[serde(default)]
    pub description: Option<String>,

    /// Free-form launch attributes
    #[serde(default)]
    pub attributes: Vec<ItemAttribute>,

    /// Report into an existing launch instead of creating a new one
    #[serde(default)]
    pub rerun: bool,

    /// Launch the rerun targets
    #[serde(default)]
    pub rerun_of: Option<String>,
}

impl Default for ReporterOptions {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            project: default_project(),
            token: None,
            launch: default_launch(),
            description: None,
            attributes: Vec::new(),
            rerun: false,
            rerun_of: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AttachmentConfig {
    /// Directory holding `<test title>.png` screenshots
    #[serde(default)]
    pub screenshots_dir: Option<PathBuf>,
}

// Default values
pub const ENV_RP_TOKEN: &str = "RP_TOKEN";
pub const CONFIG_FILE_NAME: &str = ".rpreporterrc.toml";

pub fn default_endpoint() -> String {
    String::from("http://localhost:8080/api/v1")
}

pub fn default_project() -> String {
    String::from("default_personal")
}

pub fn default_launch() -> String {
    String::from("Test run")
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Option<Self> {
        // 1. .rpreporterrc.toml (current directory)
        // 2. ~/.rpreporterrc.toml (home directory)
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd.join(CONFIG_FILE_NAME));
        }
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(CONFIG_FILE_NAME));
        }

        for path in &paths {
            if path.exists() {
                match Self::load_from_file(path) {
                    Ok(config) => return Some(config.with_env_overrides()),
                    Err(e) => {
                        tracing::warn!("Ignoring configuration {}: {:#}", path.display(), e);
                        return None;
                    }
                }
            }
        }

        None
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `RP_TOKEN` from the environment, if set
    pub fn with_env_overrides(self) -> Self {
        self.with_token_override(std::env::var(ENV_RP_TOKEN).ok())
    }

    fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            self.reporter.token = Some(token);
        }
        self
    }

    /// Generate configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }
}
