//! Course enrollment workflow: ordered validation of enroll/drop requests, the grading
//! rules that drive credit ceilings, and the collaborator contracts the service consumes.

pub mod domain;
pub mod grading;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AcademicStatus, Course, CourseCode, CourseGrade, Enrollment, EnrollmentStatus, Student,
    StudentId,
};
pub use grading::{AcademicStanding, GradeCalculator, GradeError, GradeRules};
pub use repository::{
    CourseRepository, EmailMessage, NotificationError, NotificationService, RepositoryError,
    SmsMessage, StudentRepository,
};
pub use router::{enrollment_router, CreditLimitView, EnrollmentRequest, StandingRequest};
pub use service::{EnrollmentError, EnrollmentService, CONFIRMATION_SUBJECT};
