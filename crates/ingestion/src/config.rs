//! Ingestion configuration.
//!
//! Defines where the source datasets live and how the substance ranking and
//! quarter axis are derived from them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use heatmap_common::{quarter_start, QuarterStart};

use crate::error::{IngestionError, Result};

/// Locations of the source datasets.
///
/// A location is either an `http(s)://` URL or a filesystem path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Record datasets, concatenated in this order
    #[serde(default = "default_record_locations")]
    pub records: Vec<String>,

    /// Municipal gazetteer dataset
    #[serde(default = "default_gazetteer_location")]
    pub gazetteer: String,
}

fn default_record_locations() -> Vec<String> {
    vec![
        "streetsafe_results.csv".to_string(),
        "streetsafe_results_new.csv".to_string(),
    ]
}

fn default_gazetteer_location() -> String {
    "uscities.csv".to_string()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            records: default_record_locations(),
            gazetteer: default_gazetteer_location(),
        }
    }
}

impl SourceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.records.is_empty() {
            return Err(IngestionError::InvalidConfig(
                "at least one record dataset is required".to_string(),
            ));
        }
        if self.records.iter().any(|r| r.trim().is_empty()) || self.gazetteer.trim().is_empty() {
            return Err(IngestionError::InvalidConfig(
                "dataset locations must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings for the record pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// How many of the most frequent substances to rank
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Substances always offered when present in the data
    #[serde(default = "default_force_include")]
    pub force_include: Vec<String>,

    /// Dates whose quarters are dropped from the data (any day in the quarter)
    #[serde(default = "default_excluded_quarters")]
    pub excluded_quarters: Vec<String>,
}

fn default_top_n() -> usize {
    50
}

fn default_force_include() -> Vec<String> {
    vec!["medetomidine".to_string(), "nitazene".to_string()]
}

fn default_excluded_quarters() -> Vec<String> {
    // Partial quarter at the end of the published data.
    vec!["2026-10-01".to_string()]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            force_include: default_force_include(),
            excluded_quarters: default_excluded_quarters(),
        }
    }
}

impl PipelineConfig {
    /// Parse from a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| IngestionError::InvalidConfig(e.to_string()))
    }

    /// Resolve the excluded quarter dates to quarter starts.
    pub fn excluded_quarter_starts(&self) -> Result<HashSet<QuarterStart>> {
        self.excluded_quarters
            .iter()
            .map(|s| {
                quarter_start(s).ok_or_else(|| {
                    IngestionError::InvalidConfig(format!("invalid excluded quarter date: {}", s))
                })
            })
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(IngestionError::InvalidConfig(
                "top_n must be at least 1".to_string(),
            ));
        }
        self.excluded_quarter_starts().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmap_common::quarter_label;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.top_n, 50);
        assert!(config.force_include.contains(&"nitazene".to_string()));
        assert!(config.validate().is_ok());
        assert!(SourceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_excluded_quarter_starts() {
        let config = PipelineConfig {
            excluded_quarters: vec!["2026-11-15".to_string()],
            ..Default::default()
        };
        let excluded = config.excluded_quarter_starts().unwrap();
        let labels: Vec<_> = excluded.iter().map(quarter_label).collect();
        assert_eq!(labels, vec!["2026 Q4"]);
    }

    #[test]
    fn test_invalid_excluded_quarter() {
        let config = PipelineConfig {
            excluded_quarters: vec!["someday".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(IngestionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = PipelineConfig::from_yaml("top_n: 10\nforce_include: []\n").unwrap();
        assert_eq!(config.top_n, 10);
        assert!(config.force_include.is_empty());
        assert_eq!(config.excluded_quarters, vec!["2026-10-01".to_string()]);
    }

    #[test]
    fn test_empty_sources_rejected() {
        let sources = SourceConfig {
            records: vec![],
            gazetteer: "cities.csv".to_string(),
        };
        assert!(sources.validate().is_err());
    }
}
