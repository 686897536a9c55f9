//! Application state and shared resources.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use heatmap_common::HeatLayerOptions;
use heatmap_engine::{Explorer, SceneSurface};
use ingestion::{load_dataset, CsvTableSource, Dataset, RecordPipeline};

use crate::config::ServiceConfig;
use crate::metrics::record_pipeline_report;

/// Shared application state.
///
/// The explorer sits behind a mutex so each interaction runs its whole
/// cycle before the next one starts.
pub struct AppState {
    pub explorer: Mutex<Explorer<SceneSurface>>,
}

impl AppState {
    /// Fetch every dataset and build the explorer. Any failure aborts.
    pub async fn load(config: &ServiceConfig) -> Result<Self> {
        let source = CsvTableSource::new(Duration::from_secs(config.request_timeout_secs))?;
        let pipeline = RecordPipeline::new(config.pipeline.clone())?;

        info!(
            records = ?config.sources.records,
            gazetteer = %config.sources.gazetteer,
            "Loading datasets"
        );
        let dataset = load_dataset(&source, &config.sources, &pipeline)
            .await
            .context("Failed to load datasets")?;

        Self::from_dataset(dataset, config.heat.clone())
    }

    /// Build the state over an already loaded dataset.
    pub fn from_dataset(dataset: Dataset, heat: HeatLayerOptions) -> Result<Self> {
        record_pipeline_report(dataset.report());
        let explorer = Explorer::new(dataset, SceneSurface::new(), heat)
            .context("Failed to initialize explorer")?;

        Ok(Self {
            explorer: Mutex::new(explorer),
        })
    }
}
