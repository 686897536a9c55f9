//! Municipal gazetteer lookup.
//!
//! Maps a normalized `(city, state)` key to coordinates. When several source
//! rows normalize to the same key the most populous one wins, so "Springfield,
//! Illinois" resolves to the state capital rather than a namesake village.

use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use heatmap_common::{join_key, JoinKey};

use crate::loader::RawRow;

/// Gazetteer column names.
pub mod columns {
    pub const CITY: &str = "city";
    pub const STATE: &str = "state_name";
    pub const POPULATION: &str = "population";
    pub const LATITUDE: &str = "lat";
    pub const LONGITUDE: &str = "lng";

    /// Columns that must be present in the gazetteer header.
    pub const REQUIRED: &[&str] = &[CITY, STATE, LATITUDE, LONGITUDE];
}

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Read-only lookup from normalized join key to coordinates.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    entries: HashMap<JoinKey, Coordinates>,
}

impl Gazetteer {
    /// Build the lookup from raw gazetteer rows.
    ///
    /// Rows are visited by descending population (missing or unparseable
    /// population counts as 0, ties keep source order) and only the first
    /// row per key is kept. Rows whose coordinates are not finite numbers
    /// are ignored entirely.
    pub fn from_rows(rows: &[RawRow]) -> Self {
        let mut ranked: Vec<(f64, &RawRow)> = rows
            .iter()
            .map(|row| (parse_population(row.get(columns::POPULATION)), row))
            .collect();
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut entries = HashMap::with_capacity(ranked.len());
        let mut rejected = 0usize;
        let mut merged = 0usize;

        for (_, row) in ranked {
            let Some(coords) = parse_coordinates(row) else {
                rejected += 1;
                continue;
            };
            let key = join_key(
                row.get(columns::CITY).map(String::as_str),
                row.get(columns::STATE).map(String::as_str),
            );
            if entries.contains_key(&key) {
                merged += 1;
                continue;
            }
            entries.insert(key, coords);
        }

        debug!(
            entries = entries.len(),
            rejected,
            merged,
            "Built gazetteer lookup"
        );

        Self { entries }
    }

    /// Look up coordinates for a raw (unnormalized) city/state pair.
    pub fn lookup(&self, city: Option<&str>, state: Option<&str>) -> Option<Coordinates> {
        self.entries.get(&join_key(city, state)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_population(value: Option<&String>) -> f64 {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
}

fn parse_finite(value: Option<&String>) -> Option<f64> {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_coordinates(row: &RawRow) -> Option<Coordinates> {
    Some(Coordinates {
        latitude: parse_finite(row.get(columns::LATITUDE))?,
        longitude: parse_finite(row.get(columns::LONGITUDE))?,
    })
}
