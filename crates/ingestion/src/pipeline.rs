//! The record pipeline.
//!
//! Raw record rows + gazetteer → observations, substance frequencies, the
//! substance ranking and the quarter axis. Per-row anomalies never fail the
//! run: the row is skipped and counted in the [`PipelineReport`].

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::info;

use heatmap_common::{normalize_text, quarter_label, quarter_start, QuarterStart};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::gazetteer::Gazetteer;
use crate::loader::RawRow;
use crate::substances::parse_substance_list;

/// Records dataset column names.
pub mod columns {
    pub const SAMPLE_DATE: &str = "sample_date";
    pub const SUBSTANCES: &str = "substances";
    pub const CITY: &str = "city";
    pub const STATE: &str = "state";

    /// Columns that must be present in every records header.
    pub const REQUIRED: &[&str] = &[SAMPLE_DATE, SUBSTANCES, CITY, STATE];
}

/// One (location, substance, quarter) tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub latitude: f64,
    pub longitude: f64,
    /// Normalized substance label
    pub substance: String,
    pub quarter_start: QuarterStart,
}

/// Row accounting for a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub rows_read: usize,
    pub unparseable_date: usize,
    pub excluded_quarter: usize,
    /// Rows whose city/state has no gazetteer entry
    pub unmatched_location: usize,
    /// Joined rows that produced no substance label
    pub empty_substances: usize,
    pub observations: usize,
    pub distinct_substances: usize,
}

/// Output of a pipeline run. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    observations: Vec<Observation>,
    substance_counts: IndexMap<String, usize>,
    ranking: Vec<String>,
    quarters: Vec<QuarterStart>,
    report: PipelineReport,
}

impl Dataset {
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Alphabetically sorted substance ranking.
    pub fn ranking(&self) -> &[String] {
        &self.ranking
    }

    /// Ascending, deduplicated quarter starts.
    pub fn quarters(&self) -> &[QuarterStart] {
        &self.quarters
    }

    /// Observation count per normalized substance, in first-seen order.
    pub fn substance_counts(&self) -> &IndexMap<String, usize> {
        &self.substance_counts
    }

    pub fn report(&self) -> &PipelineReport {
        &self.report
    }
}

/// Normalizes and joins record rows.
#[derive(Debug, Clone)]
pub struct RecordPipeline {
    config: PipelineConfig,
    excluded: HashSet<QuarterStart>,
}

impl RecordPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let excluded = config.excluded_quarter_starts()?;
        Ok(Self { config, excluded })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline over concatenated record rows.
    pub fn run<'a, I>(&self, rows: I, gazetteer: &Gazetteer) -> Dataset
    where
        I: IntoIterator<Item = &'a RawRow>,
    {
        let mut report = PipelineReport::default();
        let mut observations = Vec::new();
        let mut substance_counts: IndexMap<String, usize> = IndexMap::new();
        let mut quarters = BTreeSet::new();

        for row in rows {
            report.rows_read += 1;

            let Some(quarter) = row
                .get(columns::SAMPLE_DATE)
                .and_then(|date| quarter_start(date))
            else {
                report.unparseable_date += 1;
                continue;
            };
            if self.excluded.contains(&quarter) {
                report.excluded_quarter += 1;
                continue;
            }

            let Some(coords) = gazetteer.lookup(
                row.get(columns::CITY).map(String::as_str),
                row.get(columns::STATE).map(String::as_str),
            ) else {
                report.unmatched_location += 1;
                continue;
            };

            let before = observations.len();
            for label in parse_substance_list(row.get(columns::SUBSTANCES).map(String::as_str)) {
                let substance = normalize_text(Some(&label));
                if substance.is_empty() {
                    continue;
                }
                *substance_counts.entry(substance.clone()).or_insert(0) += 1;
                observations.push(Observation {
                    latitude: coords.latitude,
                    longitude: coords.longitude,
                    substance,
                    quarter_start: quarter,
                });
            }

            if observations.len() == before {
                report.empty_substances += 1;
            } else {
                quarters.insert(quarter);
            }
        }

        let ranking = rank_substances(
            &substance_counts,
            self.config.top_n,
            &self.config.force_include,
        );
        let quarters: Vec<QuarterStart> = quarters.into_iter().collect();

        report.observations = observations.len();
        report.distinct_substances = substance_counts.len();

        let first_quarter = quarters.first().map(quarter_label).unwrap_or_default();
        let last_quarter = quarters.last().map(quarter_label).unwrap_or_default();
        info!(
            rows = report.rows_read,
            unparseable_date = report.unparseable_date,
            excluded_quarter = report.excluded_quarter,
            unmatched_location = report.unmatched_location,
            empty_substances = report.empty_substances,
            observations = report.observations,
            substances = report.distinct_substances,
            ranked = ranking.len(),
            first_quarter = %first_quarter,
            last_quarter = %last_quarter,
            "Record pipeline completed"
        );

        Dataset {
            observations,
            substance_counts,
            ranking,
            quarters,
            report,
        }
    }
}

/// Top `top_n` substances by frequency (ties alphabetical), plus every
/// force-included substance that occurs at all, sorted alphabetically.
pub fn rank_substances(
    counts: &IndexMap<String, usize>,
    top_n: usize,
    force_include: &[String],
) -> Vec<String> {
    let mut by_frequency: Vec<(&String, &usize)> = counts.iter().collect();
    by_frequency.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let mut ranking: Vec<String> = by_frequency
        .into_iter()
        .take(top_n)
        .map(|(substance, _)| substance.clone())
        .collect();

    for forced in force_include {
        let forced = normalize_text(Some(forced));
        if counts.contains_key(&forced) && !ranking.contains(&forced) {
            ranking.push(forced);
        }
    }

    ranking.sort();
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, usize)]) -> IndexMap<String, usize> {
        pairs.iter().map(|(s, n)| (s.to_string(), *n)).collect()
    }

    #[test]
    fn test_rank_top_n_sorted_alphabetically() {
        let c = counts(&[("xylazine", 5), ("fentanyl", 10), ("caffeine", 1), ("lidocaine", 7)]);
        let ranking = rank_substances(&c, 3, &[]);
        assert_eq!(ranking, vec!["fentanyl", "lidocaine", "xylazine"]);
    }

    #[test]
    fn test_rank_force_include_only_when_present() {
        let c = counts(&[("fentanyl", 10), ("medetomidine", 1), ("xylazine", 4)]);
        let forced = vec!["Medetomidine".to_string(), "nitazene".to_string()];
        let ranking = rank_substances(&c, 1, &forced);
        assert_eq!(ranking, vec!["fentanyl", "medetomidine"]);
    }

    #[test]
    fn test_rank_no_duplicates() {
        let c = counts(&[("fentanyl", 10), ("medetomidine", 9)]);
        let forced = vec!["medetomidine".to_string()];
        let ranking = rank_substances(&c, 5, &forced);
        assert_eq!(ranking, vec!["fentanyl", "medetomidine"]);
    }

    #[test]
    fn test_rank_ties_broken_alphabetically() {
        let c = counts(&[("zolpidem", 2), ("alprazolam", 2), ("bromazolam", 2)]);
        assert_eq!(rank_substances(&c, 2, &[]), vec!["alprazolam", "bromazolam"]);
    }
}
