//! Tests for the record pipeline: joins, bucketing, ranking and the quarter axis.

use chrono::{TimeZone, Utc};
use heatmap_common::quarter_label;
use ingestion::pipeline::rank_substances;
use ingestion::{Gazetteer, PipelineConfig, RecordPipeline};
use test_utils::{city_row, fixtures::places, generate_records, gazetteer_rows, record_row};

fn springfield_gazetteer() -> Gazetteer {
    let (city, state, population, lat, lng) = places::SPRINGFIELD_IL;
    Gazetteer::from_rows(&[city_row(city, state, population, lat, lng)])
}

fn default_pipeline() -> RecordPipeline {
    RecordPipeline::new(PipelineConfig::default()).unwrap()
}

// ============================================================================
// Single-record scenarios
// ============================================================================

#[test]
fn test_single_record_end_to_end() {
    let rows = vec![record_row("2023-02-01", "Springfield", "Illinois", "['fentanyl']")];
    let dataset = default_pipeline().run(&rows, &springfield_gazetteer());

    assert_eq!(dataset.observations().len(), 1);
    let obs = &dataset.observations()[0];
    assert_eq!(obs.substance, "fentanyl");
    assert_eq!(obs.latitude, 39.7990);
    assert_eq!(obs.longitude, -89.6440);
    assert_eq!(quarter_label(&obs.quarter_start), "2023 Q1");
    assert_eq!(obs.quarter_start, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());

    assert_eq!(dataset.ranking(), &["fentanyl".to_string()]);
    assert_eq!(dataset.quarters().len(), 1);
}

#[test]
fn test_unmatched_city_drops_every_observation_of_the_row() {
    let rows = vec![record_row(
        "2023-02-01",
        "Shelbyville",
        "Illinois",
        "['fentanyl', 'xylazine', 'heroin']",
    )];
    let dataset = default_pipeline().run(&rows, &springfield_gazetteer());

    assert!(dataset.observations().is_empty());
    assert!(dataset.quarters().is_empty());
    assert_eq!(dataset.report().unmatched_location, 1);
}

#[test]
fn test_unparseable_date_skips_row() {
    let rows = vec![
        record_row("sometime in spring", "Springfield", "Illinois", "['fentanyl']"),
        record_row("", "Springfield", "Illinois", "['fentanyl']"),
    ];
    let dataset = default_pipeline().run(&rows, &springfield_gazetteer());

    assert!(dataset.observations().is_empty());
    assert_eq!(dataset.report().unparseable_date, 2);
}

#[test]
fn test_substance_variants_collapse() {
    let rows = vec![
        record_row("2023-02-01", "Springfield", "Illinois", "['Fentanyl']"),
        record_row("2023-02-02", "Springfield", "Illinois", "['  FENTANYL ']"),
        record_row("2023-02-03", "Springfield", "Illinois", "['Fentanýl']"),
    ];
    let dataset = default_pipeline().run(&rows, &springfield_gazetteer());

    assert_eq!(dataset.substance_counts().len(), 1);
    assert_eq!(dataset.substance_counts()["fentanyl"], 3);
}

#[test]
fn test_excluded_quarter_rows_and_axis() {
    let config = PipelineConfig {
        excluded_quarters: vec!["2023-05-15".to_string()],
        ..Default::default()
    };
    let rows = vec![
        record_row("2023-02-01", "Springfield", "Illinois", "['fentanyl']"),
        record_row("2023-04-01", "Springfield", "Illinois", "['fentanyl']"),
        record_row("2023-06-30", "Springfield", "Illinois", "['xylazine']"),
    ];
    let dataset = RecordPipeline::new(config)
        .unwrap()
        .run(&rows, &springfield_gazetteer());

    let labels: Vec<_> = dataset.quarters().iter().map(quarter_label).collect();
    assert_eq!(labels, vec!["2023 Q1"]);
    assert_eq!(dataset.report().excluded_quarter, 2);
    assert!(!dataset.ranking().contains(&"xylazine".to_string()));
}

// ============================================================================
// Whole-dataset properties
// ============================================================================

#[test]
fn test_quarter_axis_ascending_and_unique() {
    let rows = generate_records(500);
    let gazetteer = Gazetteer::from_rows(&gazetteer_rows());
    let dataset = default_pipeline().run(&rows, &gazetteer);

    let axis = dataset.quarters();
    assert_eq!(axis.len(), 5);
    assert!(axis.windows(2).all(|w| w[0] < w[1]));
    for obs in dataset.observations() {
        assert!(axis.contains(&obs.quarter_start));
    }
}

#[test]
fn test_ranking_is_top_n_plus_forced_sorted() {
    let rows = generate_records(500);
    let gazetteer = Gazetteer::from_rows(&gazetteer_rows());
    let config = PipelineConfig {
        top_n: 2,
        force_include: vec!["nitazene".to_string(), "not-in-data".to_string()],
        ..Default::default()
    };
    let dataset = RecordPipeline::new(config).unwrap().run(&rows, &gazetteer);

    let top_two = rank_substances(dataset.substance_counts(), 2, &[]);
    let nitazene = "nitazene".to_string();
    let ranking = dataset.ranking();
    assert_eq!(ranking.len(), if top_two.contains(&nitazene) { 2 } else { 3 });
    assert!(ranking.contains(&nitazene));
    assert!(top_two.iter().all(|s| ranking.contains(s)));
    assert!(!ranking.contains(&"not-in-data".to_string()));
    assert!(ranking.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_report_accounts_for_every_row() {
    let mut rows = generate_records(100);
    rows.push(record_row("bad", "Springfield", "Illinois", "['x']"));
    rows.push(record_row("2023-01-01", "Nowhere", "Illinois", "['x']"));
    rows.push(record_row("2023-01-01", "Springfield", "Illinois", "[]"));
    let gazetteer = Gazetteer::from_rows(&gazetteer_rows());
    let dataset = default_pipeline().run(&rows, &gazetteer);

    let report = dataset.report();
    assert_eq!(report.rows_read, 103);
    assert_eq!(report.unparseable_date, 1);
    assert_eq!(report.unmatched_location, 1);
    assert_eq!(report.empty_substances, 1);
    assert_eq!(report.observations, dataset.observations().len());
    let counted: usize = dataset.substance_counts().values().sum();
    assert_eq!(counted, report.observations);
}
