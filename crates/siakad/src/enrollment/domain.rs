use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registrar-issued student number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub String);

impl StudentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog code uniquely identifying a course offering, e.g. `CS101`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CourseCode(pub String);

impl CourseCode {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Standing derived from GPA and semester; suspended students cannot enroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcademicStatus {
    Active,
    Probation,
    Suspended,
}

impl AcademicStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AcademicStatus::Active => "ACTIVE",
            AcademicStatus::Probation => "PROBATION",
            AcademicStatus::Suspended => "SUSPENDED",
        }
    }

    pub const fn may_enroll(self) -> bool {
        !matches!(self, AcademicStatus::Suspended)
    }
}

impl fmt::Display for AcademicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Student record as maintained by the registrar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: StudentId,
    pub name: String,
    pub email: String,
    pub major: String,
    pub semester: u32,
    pub gpa: f64,
    pub academic_status: AcademicStatus,
}

/// Course offering with its seat counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub course_code: CourseCode,
    pub course_name: String,
    pub capacity: u32,
    pub enrolled_count: u32,
}

impl Course {
    pub fn is_full(&self) -> bool {
        self.enrolled_count >= self.capacity
    }

    pub fn available_seats(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled_count)
    }
}

/// Outcome recorded for an enrollment request.
///
/// Only `Approved` is produced today; the remaining states are reserved for
/// waitlist and manual-review flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum EnrollmentStatus {
    Approved,
    Pending,
    Rejected,
    Waitlisted,
}

impl EnrollmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EnrollmentStatus::Approved => "APPROVED",
            EnrollmentStatus::Pending => "PENDING",
            EnrollmentStatus::Rejected => "REJECTED",
            EnrollmentStatus::Waitlisted => "WAITLISTED",
        }
    }
}

/// Result of a successful enrollment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: StudentId,
    pub course_code: CourseCode,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
}

/// Completed course used as GPA input. `course_name` is a label only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseGrade {
    pub course_name: String,
    pub credits: u32,
    pub grade_point: f64,
}

impl CourseGrade {
    pub fn new(course_name: impl Into<String>, credits: u32, grade_point: f64) -> Self {
        Self {
            course_name: course_name.into(),
            credits,
            grade_point,
        }
    }
}
