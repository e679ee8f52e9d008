use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use siakad::enrollment::{
    enrollment_router, CourseRepository, EnrollmentService, GradeRules, NotificationService,
    StudentRepository,
};
use std::sync::Arc;

pub(crate) fn with_enrollment_routes<S, C, N, G>(
    service: Arc<EnrollmentService<S, C, N, G>>,
) -> axum::Router
where
    S: StudentRepository + 'static,
    C: CourseRepository + 'static,
    N: NotificationService + 'static,
    G: GradeRules + 'static,
{
    enrollment_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{seeded_campus, LoggingNotifier};
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use siakad::enrollment::GradeCalculator;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> axum::Router {
        let campus = seeded_campus().expect("seed");
        let service = Arc::new(EnrollmentService::new(
            campus.students,
            campus.courses,
            Arc::new(LoggingNotifier::new("registrar@siakad.local")),
            Arc::new(GradeCalculator::new()),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_enrollment_routes(service).layer(Extension(state))
    }

    async fn status_of(router: axum::Router, request: Request<Body>) -> StatusCode {
        router
            .oneshot(request)
            .await
            .expect("route responds")
            .status()
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let request = Request::get("/health").body(Body::empty()).expect("request");
        assert_eq!(status_of(app(false), request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let request = Request::get("/ready").body(Body::empty()).expect("request");
        assert_eq!(
            status_of(app(false), request).await,
            StatusCode::SERVICE_UNAVAILABLE
        );

        let request = Request::get("/ready").body(Body::empty()).expect("request");
        assert_eq!(status_of(app(true), request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn seeded_prerequisites_are_enforced_over_http() {
        let request = Request::post("/api/v1/enrollments")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "student_id": "S003", "course_code": "CS201" }).to_string(),
            ))
            .expect("request");

        assert_eq!(
            status_of(app(true), request).await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
