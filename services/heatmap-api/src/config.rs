//! Service configuration.
//!
//! Loaded from a YAML file when one is given, otherwise from environment
//! variables (after `.env` has been applied).

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

use heatmap_common::HeatLayerOptions;
use ingestion::{PipelineConfig, SourceConfig};

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Dataset locations
    #[serde(default)]
    pub sources: SourceConfig,

    /// Ranking and quarter-axis settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Heat-layer rendering options
    #[serde(default)]
    pub heat: HeatLayerOptions,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout for fetching each remote dataset (seconds)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_port() -> u16 {
    8050
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            sources: SourceConfig::default(),
            pipeline: PipelineConfig::default(),
            heat: HeatLayerOptions::default(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from a variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(records) = lookup("RECORDS_URLS") {
            config.sources.records = records
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(gazetteer) = lookup("GAZETTEER_URL") {
            config.sources.gazetteer = gazetteer.trim().to_string();
        }
        if let Some(top_n) = parse_var(&lookup, "TOP_N_SUBSTANCES")? {
            config.pipeline.top_n = top_n;
        }
        if let Some(radius) = parse_var(&lookup, "HEAT_RADIUS")? {
            config.heat.radius = radius;
        }
        if let Some(port) = parse_var(&lookup, "PORT")? {
            config.port = port;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.sources.validate()?;
        self.pipeline.validate()?;
        self.heat.validate()?;
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow!("Invalid {}={:?}: {}", key, value, e)),
        None => Ok(None),
    }
}
