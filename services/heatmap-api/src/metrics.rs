//! Prometheus metrics for the interaction cycle.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

use heatmap_common::LayerMode;
use heatmap_engine::ReconcileReport;
use ingestion::PipelineReport;

/// Record an API request.
pub fn record_request(endpoint: &'static str) {
    counter!("heatmap_requests_total", "endpoint" => endpoint).increment(1);
}

/// Record one reconciliation and the layer operations it issued.
pub fn record_reconcile(report: &ReconcileReport, elapsed: Duration) {
    let mode = match report.mode {
        LayerMode::Combined => "combined",
        LayerMode::PerSubstance => "per_substance",
    };
    counter!("heatmap_reconcile_total", "mode" => mode).increment(1);
    histogram!("heatmap_reconcile_duration_ms").record(elapsed.as_secs_f64() * 1000.0);

    counter!("heatmap_layer_ops_total", "op" => "created").increment(report.created() as u64);
    counter!("heatmap_layer_ops_total", "op" => "updated").increment(report.updated() as u64);
    counter!("heatmap_layer_ops_total", "op" => "removed").increment(report.removed() as u64);

    gauge!("heatmap_view_samples").set(report.stats.samples as f64);
    gauge!("heatmap_view_locations").set(report.stats.locations as f64);
}

/// Publish the load-time row accounting.
pub fn record_pipeline_report(report: &PipelineReport) {
    gauge!("heatmap_rows_read").set(report.rows_read as f64);
    gauge!("heatmap_rows_dropped", "reason" => "unparseable_date")
        .set(report.unparseable_date as f64);
    gauge!("heatmap_rows_dropped", "reason" => "excluded_quarter")
        .set(report.excluded_quarter as f64);
    gauge!("heatmap_rows_dropped", "reason" => "unmatched_location")
        .set(report.unmatched_location as f64);
    gauge!("heatmap_rows_dropped", "reason" => "empty_substances")
        .set(report.empty_substances as f64);
    gauge!("heatmap_observations").set(report.observations as f64);
}
