//! HTTP handlers.
//!
//! Read-only endpoints expose the ranking, the quarter axis, the load report
//! and the current view. Selection endpoints each run exactly one
//! filter → aggregate → reconcile cycle and return its report with the new
//! view.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

use heatmap_common::{
    normalize_text, quarter_label, HeatLayerOptions, HeatmapError, LayerKey, QuarterStart,
};
use heatmap_engine::{
    Explorer, HeatPoint, ReconcileReport, SceneSurface, Selection, SubstanceEntry, ViewStats,
};
use ingestion::PipelineReport;

use crate::metrics::{record_reconcile, record_request};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SubstancesResponse {
    pub substances: Vec<SubstanceEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuarterEntry {
    pub index: usize,
    pub start: String,
    pub label: String,
}

impl QuarterEntry {
    fn new(index: usize, start: &QuarterStart) -> Self {
        Self {
            index,
            start: start.to_rfc3339(),
            label: quarter_label(start),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuartersResponse {
    pub quarters: Vec<QuarterEntry>,
    /// Slider marks: index → label
    pub marks: BTreeMap<usize, String>,
}

/// A live layer as a client paints it.
#[derive(Debug, Serialize)]
pub struct LayerView {
    pub key: LayerKey,
    pub name: String,
    /// Substance palette color; absent for the combined layer
    pub color: Option<String>,
    /// Position → CSS color
    pub gradient: BTreeMap<String, String>,
    pub options: HeatLayerOptions,
    pub points: Vec<HeatPoint>,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub selection: Selection,
    pub quarter: Option<QuarterEntry>,
    pub stats: ViewStats,
    pub caption: String,
    pub layers: Vec<LayerView>,
}

impl ViewResponse {
    pub fn from_explorer(explorer: &Explorer<SceneSurface>) -> Self {
        let selection = explorer.selection().clone();
        let quarter = explorer
            .quarters()
            .get(selection.quarter_index)
            .map(|start| QuarterEntry::new(selection.quarter_index, start));

        let layers = explorer
            .surface()
            .layers()
            .map(|layer| LayerView {
                key: layer.key.clone(),
                name: layer.key.to_string(),
                color: layer
                    .key
                    .substance_name()
                    .map(|name| explorer.colors().color_for(name).to_hex()),
                gradient: layer.gradient.to_css_map(),
                options: layer.options.clone(),
                points: layer.points.clone(),
            })
            .collect();

        Self {
            selection,
            quarter,
            stats: explorer.stats(),
            caption: explorer.caption(),
            layers,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    pub reconcile: ReconcileReport,
    pub view: ViewResponse,
}

#[derive(Debug, Deserialize)]
pub struct QuarterRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct AllTimeRequest {
    pub enabled: bool,
}

// ============================================================================
// Errors
// ============================================================================

/// JSON error response carrying the status of the underlying error.
#[derive(Debug)]
pub struct ApiError(HeatmapError);

impl From<HeatmapError> for ApiError {
    fn from(err: HeatmapError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Health and Metrics
// ============================================================================

/// GET /health - Basic health check
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /metrics - Prometheus metrics endpoint
pub async fn metrics_handler(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}

// ============================================================================
// Read-only Views
// ============================================================================

/// GET /api/substances - Ranked substances with colors
pub async fn substances_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<SubstancesResponse> {
    record_request("substances");
    let explorer = state.explorer.lock().await;
    Json(SubstancesResponse {
        substances: explorer.substances(),
    })
}

/// GET /api/quarters - Quarter axis and slider marks
pub async fn quarters_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<QuartersResponse> {
    record_request("quarters");
    let explorer = state.explorer.lock().await;
    Json(QuartersResponse {
        quarters: explorer
            .quarters()
            .iter()
            .enumerate()
            .map(|(i, start)| QuarterEntry::new(i, start))
            .collect(),
        marks: explorer.quarter_marks(),
    })
}

/// GET /api/report - Row accounting from the initial load
pub async fn report_handler(Extension(state): Extension<Arc<AppState>>) -> Json<PipelineReport> {
    record_request("report");
    let explorer = state.explorer.lock().await;
    Json(explorer.report().clone())
}

/// GET /api/view - Current selection, statistics and live layers
pub async fn view_handler(Extension(state): Extension<Arc<AppState>>) -> Json<ViewResponse> {
    record_request("view");
    let explorer = state.explorer.lock().await;
    Json(ViewResponse::from_explorer(&explorer))
}

// ============================================================================
// Selection Entry Points
// ============================================================================

/// POST /api/selection/substances/:name/toggle
#[instrument(skip(state))]
pub async fn toggle_substance_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<InteractionResponse>, ApiError> {
    if normalize_text(Some(&name)).is_empty() {
        return Err(HeatmapError::InvalidParameter {
            param: "name".to_string(),
            message: "substance name is empty".to_string(),
        }
        .into());
    }
    Ok(interact(&state, "toggle_substance", |explorer| explorer.toggle_substance(&name)).await)
}

/// POST /api/selection/all
pub async fn select_all_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<InteractionResponse> {
    interact(&state, "select_all", |explorer| explorer.select_all()).await
}

/// POST /api/selection/clear
pub async fn clear_selection_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<InteractionResponse> {
    interact(&state, "clear_selection", |explorer| explorer.clear_selection()).await
}

/// PUT /api/selection/quarter
#[instrument(skip(state))]
pub async fn set_quarter_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<QuarterRequest>,
) -> Json<InteractionResponse> {
    interact(&state, "set_quarter", |explorer| {
        explorer.set_quarter_index(request.index)
    })
    .await
}

/// PUT /api/selection/all-time
#[instrument(skip(state))]
pub async fn set_all_time_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<AllTimeRequest>,
) -> Json<InteractionResponse> {
    interact(&state, "set_all_time", |explorer| {
        explorer.set_show_all_time(request.enabled)
    })
    .await
}

/// Run one interaction under the explorer lock.
async fn interact<F>(state: &AppState, endpoint: &'static str, action: F) -> Json<InteractionResponse>
where
    F: FnOnce(&mut Explorer<SceneSurface>) -> ReconcileReport,
{
    record_request(endpoint);
    let mut explorer = state.explorer.lock().await;

    let start = Instant::now();
    let reconcile = action(&mut *explorer);
    record_reconcile(&reconcile, start.elapsed());

    info!(
        endpoint,
        mode = ?reconcile.mode,
        ops = reconcile.ops.len(),
        samples = reconcile.stats.samples,
        locations = reconcile.stats.locations,
        "Selection updated"
    );

    Json(InteractionResponse {
        reconcile,
        view: ViewResponse::from_explorer(&explorer),
    })
}
