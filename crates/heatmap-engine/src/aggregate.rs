//! Aggregator: per-coordinate counts and normalized heat points.

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::Serialize;

use ingestion::Observation;

/// Exact (latitude, longitude) pair usable as a map key.
pub type CoordKey = (OrderedFloat<f64>, OrderedFloat<f64>);

/// One point handed to the heat-rendering primitive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Count relative to the busiest coordinate in the same aggregate, in (0, 1]
    pub intensity: f64,
}

/// Occurrence counts per exact coordinate, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Aggregate {
    counts: IndexMap<CoordKey, u32>,
}

impl Aggregate {
    pub fn from_observations<'a, I>(observations: I) -> Self
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        let mut counts: IndexMap<CoordKey, u32> = IndexMap::new();
        for obs in observations {
            *counts
                .entry((OrderedFloat(obs.latitude), OrderedFloat(obs.longitude)))
                .or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Number of distinct coordinates.
    pub fn locations(&self) -> usize {
        self.counts.len()
    }

    /// Total observations counted.
    pub fn samples(&self) -> u64 {
        self.counts.values().map(|&c| c as u64).sum()
    }

    pub fn max_count(&self) -> u32 {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Points normalized against this aggregate's own maximum.
    ///
    /// The maximum is floored at 1, so an empty aggregate yields no points.
    pub fn points(&self) -> Vec<HeatPoint> {
        let max = self.max_count().max(1) as f64;
        self.counts
            .iter()
            .map(|(&(lat, lng), &count)| HeatPoint {
                latitude: lat.into_inner(),
                longitude: lng.into_inner(),
                intensity: count as f64 / max,
            })
            .collect()
    }
}
