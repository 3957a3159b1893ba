use crate::infra::{deserialize_optional_date, quality_service, resolve_today, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use batch_quality::config::ReportingConfig;
use batch_quality::error::AppError;
use batch_quality::workflows::import::ImportSummary;
use batch_quality::workflows::quality::report::views::{
    AcceptanceReport, AlertListEntry, AlertSummary, DateWindow, QualityStatistics, ScoreEntry,
};
use batch_quality::workflows::quality::{
    quality_router, BatchQualityService, QualityServiceError, RecordStore,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;

/// One-off dashboard over an inline CSV export; nothing is persisted.
#[derive(Debug, Deserialize)]
pub(crate) struct QualityReportRequest {
    pub(crate) csv: String,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) date_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) date_to: Option<NaiveDate>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QualityDashboard {
    pub(crate) today: NaiveDate,
    pub(crate) import: ImportSummary,
    pub(crate) statistics: QualityStatistics,
    pub(crate) top_performers: Vec<ScoreEntry>,
    pub(crate) poor_performers: Vec<ScoreEntry>,
    pub(crate) acceptance: AcceptanceReport,
    pub(crate) alerts: AlertSummary,
    pub(crate) critical_alerts: Vec<AlertListEntry>,
}

pub(crate) fn with_quality_routes<S>(service: Arc<BatchQualityService<S>>) -> axum::Router
where
    S: RecordStore + 'static,
{
    quality_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/quality/report",
            axum::routing::post(quality_report_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn quality_report_endpoint(
    Json(payload): Json<QualityReportRequest>,
) -> Result<Json<QualityDashboard>, AppError> {
    let QualityReportRequest {
        csv,
        today,
        date_from,
        date_to,
        limit,
    } = payload;

    let window = DateWindow { date_from, date_to };
    window.validate().map_err(QualityServiceError::from)?;

    let today = resolve_today(today);
    let service = quality_service(Arc::default(), ReportingConfig::default(), Some(today));
    let import = service.import_csv(Cursor::new(csv.into_bytes()))?;
    let dashboard = build_dashboard(&service, today, import, window, limit)?;

    Ok(Json(dashboard))
}

/// Gathers every report over the service's working set.
pub(crate) fn build_dashboard<S>(
    service: &BatchQualityService<S>,
    today: NaiveDate,
    import: ImportSummary,
    window: DateWindow,
    limit: Option<usize>,
) -> Result<QualityDashboard, QualityServiceError>
where
    S: RecordStore + 'static,
{
    Ok(QualityDashboard {
        today,
        import,
        statistics: service.statistics()?,
        top_performers: service.top_performers(limit)?,
        poor_performers: service.poor_performers(limit)?,
        acceptance: service.acceptance_stats(window)?,
        alerts: service.alerts_count()?,
        critical_alerts: service.alerts_list(Some("critical"), None, limit)?,
    })
}
