use crate::cli::ServeArgs;
use crate::infra::{seeded_campus, AppState, LoggingNotifier};
use crate::routes::with_enrollment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use siakad::config::AppConfig;
use siakad::enrollment::{EnrollmentService, GradeCalculator};
use siakad::error::AppError;
use siakad::telemetry;
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

    let campus = seeded_campus().map_err(siakad::enrollment::EnrollmentError::from)?;
    let notifier = Arc::new(LoggingNotifier::new(config.notifications.sender.clone()));
    let enrollment_service = Arc::new(EnrollmentService::new(
        campus.students,
        campus.courses,
        notifier,
        Arc::new(GradeCalculator::new()),
    ));

    let app = with_enrollment_routes(enrollment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "enrollment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
