use serde::{Deserialize, Serialize};

use super::domain::{Course, CourseCode, Student, StudentId};

/// Student storage owned by the registrar; the enrollment service only reads from it.
pub trait StudentRepository: Send + Sync {
    fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError>;
    fn save(&self, student: Student) -> Result<(), RepositoryError>;
    fn update(&self, student: Student) -> Result<(), RepositoryError>;
    fn completed_courses(&self, id: &StudentId) -> Result<Vec<Course>, RepositoryError>;
    fn delete(&self, id: &StudentId) -> Result<(), RepositoryError>;
}

/// Course catalog storage, including the prerequisite lookup.
pub trait CourseRepository: Send + Sync {
    fn find_by_course_code(&self, code: &CourseCode) -> Result<Option<Course>, RepositoryError>;
    fn save(&self, course: Course) -> Result<(), RepositoryError>;
    fn update(&self, course: Course) -> Result<(), RepositoryError>;
    fn is_prerequisite_met(
        &self,
        student_id: &StudentId,
        course_code: &CourseCode,
    ) -> Result<bool, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound messaging hooks (SMTP, SMS gateway, or test doubles).
pub trait NotificationService: Send + Sync {
    fn send_email(&self, message: EmailMessage) -> Result<(), NotificationError>;
    fn send_sms(&self, message: SmsMessage) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsMessage {
    pub phone: String,
    pub message: String,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
    #[error("invalid recipient '{0}'")]
    InvalidRecipient(String),
}
