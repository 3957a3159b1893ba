use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRecordStore};
use crate::routes::with_quality_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use batch_quality::config::AppConfig;
use batch_quality::error::AppError;
use batch_quality::telemetry;
use batch_quality::workflows::quality::BatchQualityService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryRecordStore::default());
    let quality_service = Arc::new(BatchQualityService::new(store, config.reporting.clone()));

    let app = with_quality_routes(quality_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "batch quality service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
