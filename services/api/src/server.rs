use crate::cli::ServeArgs;
use crate::infra::{memory_backend, AppState};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_board::api::{api_router, PROTOCOL_VERSION};
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(cost) = args.unlock_cost.take() {
        config.ledger.unlock_cost = cost;
    }

    telemetry::init(&config.telemetry)?;
    if config.auth.admin.is_none() {
        warn!("APP_ADMIN_EMAIL/APP_ADMIN_PASSWORD unset; admin login disabled");
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let backend = memory_backend(&config.auth, config.ledger);
    let app = with_operational_routes(api_router(backend))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        unlock_cost = config.ledger.unlock_cost,
        protocol = PROTOCOL_VERSION,
        "job board api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
