//! Tests for concurrent dataset loading from CSV files.

use std::time::Duration;

use heatmap_common::quarter_label;
use ingestion::{
    load_dataset, CsvTableSource, IngestionError, PipelineConfig, RecordPipeline, SourceConfig,
};
use test_utils::{fixtures, fixtures::places, write_fixture};

fn source() -> CsvTableSource {
    CsvTableSource::new(Duration::from_secs(5)).unwrap()
}

fn pipeline() -> RecordPipeline {
    RecordPipeline::new(PipelineConfig::default()).unwrap()
}

#[tokio::test]
async fn test_load_fixture_datasets() {
    let dir = tempfile::tempdir().unwrap();
    let old = write_fixture(&dir, "old.csv", fixtures::RECORDS_OLD_CSV);
    let new = write_fixture(&dir, "new.csv", fixtures::RECORDS_NEW_CSV);
    let cities = write_fixture(&dir, "cities.csv", fixtures::GAZETTEER_CSV);

    let sources = SourceConfig {
        records: vec![old.display().to_string(), new.display().to_string()],
        gazetteer: cities.display().to_string(),
    };
    let dataset = load_dataset(&source(), &sources, &pipeline()).await.unwrap();

    let report = dataset.report();
    assert_eq!(report.rows_read, 9);
    assert_eq!(report.unparseable_date, 1);
    assert_eq!(report.excluded_quarter, 1);
    assert_eq!(report.unmatched_location, 1);
    assert_eq!(report.empty_substances, 1);
    assert_eq!(report.observations, 8);

    assert_eq!(
        dataset.ranking(),
        &["fentanyl", "heroin", "medetomidine", "xylazine"].map(String::from)
    );
    let labels: Vec<_> = dataset.quarters().iter().map(quarter_label).collect();
    assert_eq!(labels, vec!["2023 Q1", "2023 Q2", "2024 Q1"]);

    // Concatenation order is preserved: old file rows come first.
    assert_eq!(dataset.observations()[0].latitude, 39.7990);
}

#[tokio::test]
async fn test_more_populous_namesake_wins() {
    let dir = tempfile::tempdir().unwrap();
    let mut gazetteer = String::from("city,state_name,population,lat,lng\n");
    // Village listed first so source order alone would pick it.
    for (city, state, population, lat, lng) in
        [places::SPRINGFIELD_IL_VILLAGE, places::SPRINGFIELD_IL]
    {
        gazetteer.push_str(&format!("{city},{state},{population},{lat},{lng}\n"));
    }
    let records = write_fixture(
        &dir,
        "records.csv",
        "sample_date,substances,city,state\n2023-03-01,['fentanyl'],SPRINGFIELD,illinois\n",
    );
    let cities = write_fixture(&dir, "cities.csv", &gazetteer);
    let sources = SourceConfig {
        records: vec![records.display().to_string()],
        gazetteer: cities.display().to_string(),
    };

    let dataset = load_dataset(&source(), &sources, &pipeline()).await.unwrap();
    let (.., lat, lng) = places::SPRINGFIELD_IL;
    let obs = &dataset.observations()[0];
    assert_eq!(obs.latitude, lat.parse::<f64>().unwrap());
    assert_eq!(obs.longitude, lng.parse::<f64>().unwrap());
}

#[tokio::test]
async fn test_missing_file_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    let old = write_fixture(&dir, "old.csv", fixtures::RECORDS_OLD_CSV);
    let sources = SourceConfig {
        records: vec![old.display().to_string()],
        gazetteer: dir.path().join("missing.csv").display().to_string(),
    };

    let err = load_dataset(&source(), &sources, &pipeline()).await.unwrap_err();
    assert!(matches!(err, IngestionError::Fetch { .. }));
}

#[tokio::test]
async fn test_missing_sample_date_column() {
    let dir = tempfile::tempdir().unwrap();
    let records = write_fixture(&dir, "records.csv", fixtures::RECORDS_WITHOUT_DATE_CSV);
    let cities = write_fixture(&dir, "cities.csv", fixtures::GAZETTEER_CSV);
    let sources = SourceConfig {
        records: vec![records.display().to_string()],
        gazetteer: cities.display().to_string(),
    };

    let err = load_dataset(&source(), &sources, &pipeline()).await.unwrap_err();
    match err {
        IngestionError::MissingColumn { column, .. } => assert_eq!(column, "sample_date"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_no_quarters_is_a_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let records = write_fixture(
        &dir,
        "records.csv",
        "sample_date,substances,city,state\n2023-01-01,['fentanyl'],Atlantis,Ocean\n",
    );
    let cities = write_fixture(&dir, "cities.csv", fixtures::GAZETTEER_CSV);
    let sources = SourceConfig {
        records: vec![records.display().to_string()],
        gazetteer: cities.display().to_string(),
    };

    let err = load_dataset(&source(), &sources, &pipeline()).await.unwrap_err();
    assert!(matches!(err, IngestionError::EmptyQuarterAxis));
}
