//! Fetching and decoding of the source datasets.
//!
//! Every record dataset and the gazetteer are fetched concurrently; the
//! pipeline only runs once all of them have arrived. Any single failure
//! aborts the load.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::try_join_all;
use reqwest::Client;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

use crate::config::SourceConfig;
use crate::error::{IngestionError, Result};
use crate::gazetteer::{self, Gazetteer};
use crate::pipeline::{self, Dataset, RecordPipeline};

/// A tabular row: column name → cell text.
pub type RawRow = HashMap<String, String>;

/// A decoded table with its header row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl Table {
    /// Build a table from header names and row cells (missing cells are empty).
    pub fn from_records<H, R>(headers: &[H], records: &[R]) -> Self
    where
        H: AsRef<str>,
        R: AsRef<[String]>,
    {
        let headers: Vec<String> = headers.iter().map(|h| h.as_ref().to_string()).collect();
        let rows = records
            .iter()
            .map(|record| {
                let cells = record.as_ref();
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), cells.get(i).cloned().unwrap_or_default()))
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    /// Fail with `MissingColumn` unless every `required` column is present.
    pub fn require_columns(&self, dataset: &str, required: &[&str]) -> Result<()> {
        for column in required {
            if !self.headers.iter().any(|h| h == column) {
                return Err(IngestionError::MissingColumn {
                    dataset: dataset.to_string(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Source of tabular datasets.
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Fetch and decode the table at `location`.
    async fn fetch_table(&self, location: &str) -> Result<Table>;
}

/// CSV tables over HTTP(S) or the local filesystem.
#[derive(Debug, Clone)]
pub struct CsvTableSource {
    client: Client,
}

impl CsvTableSource {
    /// Create a source with the given HTTP request timeout.
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| IngestionError::InvalidConfig(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn fetch_bytes(&self, location: &str) -> Result<Bytes> {
        if is_url(location) {
            let fetch_error = |e: reqwest::Error| IngestionError::Fetch {
                location: location.to_string(),
                message: e.to_string(),
            };
            let response = self
                .client
                .get(location)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(fetch_error)?;
            response.bytes().await.map_err(fetch_error)
        } else {
            let data = tokio::fs::read(location).await.map_err(|e| IngestionError::Fetch {
                location: location.to_string(),
                message: e.to_string(),
            })?;
            Ok(Bytes::from(data))
        }
    }
}

#[async_trait]
impl TableSource for CsvTableSource {
    #[instrument(skip(self))]
    async fn fetch_table(&self, location: &str) -> Result<Table> {
        let start = Instant::now();
        let data = self.fetch_bytes(location).await?;
        let table = decode_csv(location, &data)?;
        debug!(
            bytes = data.len(),
            rows = table.rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched table"
        );
        Ok(table)
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Decode CSV bytes with a header row into a [`Table`].
pub fn decode_csv(location: &str, data: &[u8]) -> Result<Table> {
    let decode_error = |e: csv::Error| IngestionError::CsvDecode {
        location: location.to_string(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(decode_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(decode_error)?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    Ok(Table::from_records(&headers, &records))
}

/// Fetch every source concurrently, join and normalize them.
pub async fn load_dataset<S>(
    source: &S,
    sources: &SourceConfig,
    pipeline: &RecordPipeline,
) -> Result<Dataset>
where
    S: TableSource + ?Sized,
{
    sources.validate()?;
    let start = Instant::now();

    let record_fetches = try_join_all(sources.records.iter().map(|loc| source.fetch_table(loc)));
    let gazetteer_fetch = source.fetch_table(&sources.gazetteer);
    let (record_tables, gazetteer_table) = futures::try_join!(record_fetches, gazetteer_fetch)?;

    for (location, table) in sources.records.iter().zip(&record_tables) {
        table.require_columns(location, pipeline::columns::REQUIRED)?;
    }
    gazetteer_table.require_columns(&sources.gazetteer, gazetteer::columns::REQUIRED)?;

    let gazetteer = Gazetteer::from_rows(&gazetteer_table.rows);
    let dataset = pipeline.run(record_tables.iter().flat_map(|t| t.rows.iter()), &gazetteer);

    if dataset.quarters().is_empty() {
        return Err(IngestionError::EmptyQuarterAxis);
    }

    info!(
        record_files = record_tables.len(),
        gazetteer_entries = gazetteer.len(),
        observations = dataset.observations().len(),
        quarters = dataset.quarters().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Datasets loaded"
    );

    Ok(dataset)
}
