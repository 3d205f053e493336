//! Configuration Management
//!
//! Resolution order for every setting: CLI flag, then config file, then
//! environment. A missing region after resolution is a fatal startup error;
//! everything downstream assumes the session is bound to exactly one region.

use crate::aws::auth;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How collections are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// User configuration persisted between invocations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default region
    #[serde(default)]
    pub region: Option<String>,
    /// Default output format
    #[serde(default)]
    pub output: Option<OutputFormat>,
    /// Endpoint override (gateways, local stacks)
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("clamity").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load configuration from a specific file (missing or malformed files
    /// fall back to defaults).
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Resolve the effective settings for this invocation.
    pub fn resolve(
        &self,
        cli_region: Option<String>,
        cli_output: Option<OutputFormat>,
        cli_endpoint: Option<String>,
    ) -> Result<Settings> {
        let Some(region) = cli_region
            .or_else(|| self.region.clone())
            .or_else(auth::default_region)
        else {
            bail!("could not determine region; use --region or set AWS_DEFAULT_REGION");
        };

        Ok(Settings {
            region,
            output: cli_output.or(self.output).unwrap_or_default(),
            endpoint: cli_endpoint
                .or_else(|| self.endpoint.clone())
                .or_else(|| std::env::var("AWS_ENDPOINT_URL").ok()),
        })
    }
}

/// Fully-resolved settings for one command invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub region: String,
    pub output: OutputFormat,
    pub endpoint: Option<String>,
}
