use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{CourseCode, CourseGrade, StudentId};
use super::grading::{GradeCalculator, GradeRules};
use super::repository::{CourseRepository, NotificationService, StudentRepository};
use super::service::{EnrollmentError, EnrollmentService};

/// Router builder exposing enrollment, drop, credit-limit, and standing endpoints.
pub fn enrollment_router<S, C, N, G>(service: Arc<EnrollmentService<S, C, N, G>>) -> Router
where
    S: StudentRepository + 'static,
    C: CourseRepository + 'static,
    N: NotificationService + 'static,
    G: GradeRules + 'static,
{
    Router::new()
        .route("/api/v1/enrollments", post(enroll_handler::<S, C, N, G>))
        .route(
            "/api/v1/enrollments/:student_id/:course_code",
            delete(drop_handler::<S, C, N, G>),
        )
        .route(
            "/api/v1/students/:student_id/credit-limit",
            get(credit_limit_handler::<S, C, N, G>),
        )
        .route("/api/v1/grades/standing", post(standing_handler))
        .with_state(service)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub student_id: StudentId,
    pub course_code: CourseCode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditLimitQuery {
    pub requested: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditLimitView {
    pub student_id: StudentId,
    pub requested_credits: u32,
    pub max_credits: u32,
    pub allowed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingRequest {
    pub grades: Vec<CourseGrade>,
    pub semester: u32,
}

impl EnrollmentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EnrollmentError::StudentNotFound(_) | EnrollmentError::CourseNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            EnrollmentError::EnrollmentBlocked { .. } => StatusCode::FORBIDDEN,
            EnrollmentError::CourseFull { .. } => StatusCode::CONFLICT,
            EnrollmentError::PrerequisiteNotMet { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            EnrollmentError::Grading(_) => StatusCode::BAD_REQUEST,
            EnrollmentError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn error_response(error: &EnrollmentError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (error.status_code(), axum::Json(payload)).into_response()
}

pub(crate) async fn enroll_handler<S, C, N, G>(
    State(service): State<Arc<EnrollmentService<S, C, N, G>>>,
    axum::Json(request): axum::Json<EnrollmentRequest>,
) -> Response
where
    S: StudentRepository + 'static,
    C: CourseRepository + 'static,
    N: NotificationService + 'static,
    G: GradeRules + 'static,
{
    match service.enroll_course(&request.student_id, &request.course_code) {
        Ok(enrollment) => (StatusCode::CREATED, axum::Json(enrollment)).into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn drop_handler<S, C, N, G>(
    State(service): State<Arc<EnrollmentService<S, C, N, G>>>,
    Path((student_id, course_code)): Path<(String, String)>,
) -> Response
where
    S: StudentRepository + 'static,
    C: CourseRepository + 'static,
    N: NotificationService + 'static,
    G: GradeRules + 'static,
{
    let student_id = StudentId(student_id);
    let course_code = CourseCode(course_code);
    match service.drop_course(&student_id, &course_code) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn credit_limit_handler<S, C, N, G>(
    State(service): State<Arc<EnrollmentService<S, C, N, G>>>,
    Path(student_id): Path<String>,
    Query(query): Query<CreditLimitQuery>,
) -> Response
where
    S: StudentRepository + 'static,
    C: CourseRepository + 'static,
    N: NotificationService + 'static,
    G: GradeRules + 'static,
{
    let student_id = StudentId(student_id);
    match service.max_credits(&student_id) {
        Ok(max_credits) => {
            let view = CreditLimitView {
                student_id,
                requested_credits: query.requested,
                max_credits,
                allowed: query.requested <= max_credits,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(&error),
    }
}

pub(crate) async fn standing_handler(axum::Json(request): axum::Json<StandingRequest>) -> Response {
    match GradeCalculator::new().evaluate_standing(&request.grades, request.semester) {
        Ok(standing) => (StatusCode::OK, axum::Json(standing)).into_response(),
        Err(error) => error_response(&EnrollmentError::Grading(error)),
    }
}
