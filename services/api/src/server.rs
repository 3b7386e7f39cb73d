use crate::cli::ServeArgs;
use crate::infra::{Allocator, AppState};
use crate::routes::with_assignment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use review_allocator::config::AppConfig;
use review_allocator::error::AppError;
use review_allocator::telemetry;
use review_allocator::workflows::assignment::KeywordOverlapOracle;
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

    let strategy = config.allocation.strategy;
    let allocator = Arc::new(Allocator::new(
        Arc::new(KeywordOverlapOracle),
        config.allocation.clone(),
    ));

    let app = with_assignment_routes(allocator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, strategy = strategy.label(), "reviewer allocator ready");

    axum::serve(listener, app).await?;
    Ok(())
}
