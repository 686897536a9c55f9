//! Drug-checking record ingestion.
//!
//! Turns raw tabular datasets into geo-referenced observations.
//!
//! # Architecture
//!
//! - Substance-list cell decoding with a layered, never-failing fallback
//! - Gazetteer construction keyed by normalized (city, state)
//! - The record pipeline: quarter bucketing, gazetteer join, substance
//!   explosion, frequency ranking and the quarter axis
//! - Concurrent fetching of every source dataset (HTTP or filesystem)

pub mod config;
pub mod error;
pub mod gazetteer;
pub mod loader;
pub mod pipeline;
pub mod substances;

// Re-exports
pub use config::{PipelineConfig, SourceConfig};
pub use error::{IngestionError, Result};
pub use gazetteer::{Coordinates, Gazetteer};
pub use loader::{decode_csv, load_dataset, CsvTableSource, RawRow, Table, TableSource};
pub use pipeline::{Dataset, Observation, PipelineReport, RecordPipeline};
pub use substances::parse_substance_list;
