//! Shared test utilities for the substance heatmap workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Record and gazetteer fixture rows
//! - CSV writers for loader tests
//! - Synthetic record generators
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, record_row};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

/// A row as produced by the CSV collaborator: column name → cell text.
pub type Row = HashMap<String, String>;

/// Build a records-dataset row.
pub fn record_row(sample_date: &str, city: &str, state: &str, substances: &str) -> Row {
    row(&[
        ("sample_date", sample_date),
        ("city", city),
        ("state", state),
        ("substances", substances),
    ])
}

/// Build a gazetteer row.
pub fn city_row(city: &str, state_name: &str, population: &str, lat: &str, lng: &str) -> Row {
    row(&[
        ("city", city),
        ("state_name", state_name),
        ("population", population),
        ("lat", lat),
        ("lng", lng),
    ])
}

/// Build a row from column/value pairs.
pub fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Write `contents` to `name` inside `dir` and return the full path.
///
/// # Panics
///
/// Panics if the file cannot be written; intended for tests only.
pub fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create fixture file");
    file.write_all(contents.as_bytes()).expect("write fixture file");
    path
}
