use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::BatchSnapshot;
use super::report::views::DateWindow;
use super::service::{BatchQualityService, QualityServiceError};
use super::store::{RecordStore, RecordStoreError};
use crate::workflows::import::BatchImportError;

/// Router builder exposing batch CRUD, bulk import, refresh, and the quality
/// dashboards.
pub fn quality_router<S>(service: Arc<BatchQualityService<S>>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/batches",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route("/api/v1/batches/import", post(import_handler::<S>))
        .route("/api/v1/batches/refresh", post(refresh_handler::<S>))
        .route(
            "/api/v1/batches/:batch_number",
            get(detail_handler::<S>)
                .put(replace_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route("/api/v1/quality/scores", get(scores_handler::<S>))
        .route("/api/v1/quality/statistics", get(statistics_handler::<S>))
        .route(
            "/api/v1/quality/top-performers",
            get(top_performers_handler::<S>),
        )
        .route(
            "/api/v1/quality/poor-performers",
            get(poor_performers_handler::<S>),
        )
        .route("/api/v1/quality/by-grade", get(by_grade_handler::<S>))
        .route("/api/v1/quality/acceptance", get(acceptance_handler::<S>))
        .route("/api/v1/quality/alerts/count", get(alerts_count_handler::<S>))
        .route("/api/v1/quality/alerts", get(alerts_list_handler::<S>))
        .with_state(service)
}

type ServiceState<S> = State<Arc<BatchQualityService<S>>>;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchQuery {
    pub(crate) search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LimitQuery {
    pub(crate) n: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GradeQuery {
    pub(crate) grade: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AcceptanceQuery {
    pub(crate) date_from: Option<NaiveDate>,
    pub(crate) date_to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AlertQuery {
    pub(crate) severity: Option<String>,
    #[serde(rename = "type")]
    pub(crate) kind: Option<String>,
    pub(crate) limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RefreshQuery {
    pub(crate) dry_run: Option<bool>,
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, QualityServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: QualityServiceError) -> Response {
    let status = match &error {
        QualityServiceError::Report(_) => StatusCode::BAD_REQUEST,
        QualityServiceError::MissingBatchNumber => StatusCode::UNPROCESSABLE_ENTITY,
        QualityServiceError::Import(BatchImportError::Csv(_)) => StatusCode::BAD_REQUEST,
        QualityServiceError::Store(RecordStoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        QualityServiceError::Store(RecordStoreError::Conflict(_)) => StatusCode::CONFLICT,
        QualityServiceError::Store(RecordStoreError::Unavailable(_))
        | QualityServiceError::Import(BatchImportError::Io(_)) => {
            error!(%error, "quality request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

pub(crate) async fn list_handler<S>(
    State(service): ServiceState<S>,
    Query(query): Query<SearchQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::OK, service.list(query.search.as_deref()))
}

pub(crate) async fn create_handler<S>(
    State(service): ServiceState<S>,
    Json(snapshot): Json<BatchSnapshot>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::CREATED, service.create(snapshot))
}

pub(crate) async fn detail_handler<S>(
    State(service): ServiceState<S>,
    Path(batch_number): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::OK, service.detail(&batch_number))
}

pub(crate) async fn replace_handler<S>(
    State(service): ServiceState<S>,
    Path(batch_number): Path<String>,
    Json(snapshot): Json<BatchSnapshot>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::OK, service.replace(&batch_number, snapshot))
}

pub(crate) async fn delete_handler<S>(
    State(service): ServiceState<S>,
    Path(batch_number): Path<String>,
) -> Response
where
    S: RecordStore + 'static,
{
    match service.delete(&batch_number) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn import_handler<S>(State(service): ServiceState<S>, body: String) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::OK, service.import_csv(body.as_bytes()))
}

pub(crate) async fn refresh_handler<S>(
    State(service): ServiceState<S>,
    Query(query): Query<RefreshQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(
        StatusCode::OK,
        service.refresh(query.dry_run.unwrap_or(false)),
    )
}

pub(crate) async fn scores_handler<S>(State(service): ServiceState<S>) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::OK, service.scores())
}

pub(crate) async fn statistics_handler<S>(State(service): ServiceState<S>) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::OK, service.statistics())
}

pub(crate) async fn top_performers_handler<S>(
    State(service): ServiceState<S>,
    Query(query): Query<LimitQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::OK, service.top_performers(query.n))
}

pub(crate) async fn poor_performers_handler<S>(
    State(service): ServiceState<S>,
    Query(query): Query<LimitQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::OK, service.poor_performers(query.n))
}

pub(crate) async fn by_grade_handler<S>(
    State(service): ServiceState<S>,
    Query(query): Query<GradeQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    let grade = query.grade.unwrap_or_default();
    respond(StatusCode::OK, service.by_grade(&grade))
}

pub(crate) async fn acceptance_handler<S>(
    State(service): ServiceState<S>,
    Query(query): Query<AcceptanceQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    let window = DateWindow {
        date_from: query.date_from,
        date_to: query.date_to,
    };
    respond(StatusCode::OK, service.acceptance_stats(window))
}

pub(crate) async fn alerts_count_handler<S>(State(service): ServiceState<S>) -> Response
where
    S: RecordStore + 'static,
{
    respond(StatusCode::OK, service.alerts_count())
}

pub(crate) async fn alerts_list_handler<S>(
    State(service): ServiceState<S>,
    Query(query): Query<AlertQuery>,
) -> Response
where
    S: RecordStore + 'static,
{
    respond(
        StatusCode::OK,
        service.alerts_list(
            query.severity.as_deref(),
            query.kind.as_deref(),
            query.limit,
        ),
    )
}
