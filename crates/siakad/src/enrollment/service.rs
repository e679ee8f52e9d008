use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::domain::{
    AcademicStatus, Course, CourseCode, Enrollment, EnrollmentStatus, Student, StudentId,
};
use super::grading::{GradeCalculator, GradeError, GradeRules};
use super::repository::{
    CourseRepository, EmailMessage, NotificationError, NotificationService, RepositoryError,
    StudentRepository,
};

pub const CONFIRMATION_SUBJECT: &str = "Enrollment Confirmation";

/// Service composing the student and course repositories, the notifier, and the grading rules.
///
/// Every public operation is a short validation chain that stops at the first failed
/// precondition. Seat changes for a course are serialized through a per-course lock so the
/// capacity check and the counter update happen as one step.
pub struct EnrollmentService<S, C, N, G = GradeCalculator> {
    students: Arc<S>,
    courses: Arc<C>,
    notifications: Arc<N>,
    grades: Arc<G>,
    seat_locks: CourseLocks,
}

impl<S, C, N, G> EnrollmentService<S, C, N, G>
where
    S: StudentRepository + 'static,
    C: CourseRepository + 'static,
    N: NotificationService + 'static,
    G: GradeRules + 'static,
{
    pub fn new(students: Arc<S>, courses: Arc<C>, notifications: Arc<N>, grades: Arc<G>) -> Self {
        Self {
            students,
            courses,
            notifications,
            grades,
            seat_locks: CourseLocks::default(),
        }
    }

    /// Enroll a student in a course and send the confirmation e-mail.
    pub fn enroll_course(
        &self,
        student_id: &StudentId,
        course_code: &CourseCode,
    ) -> Result<Enrollment, EnrollmentError> {
        let student = self.require_student(student_id)?;

        if !student.academic_status.may_enroll() {
            debug!(%student_id, status = %student.academic_status, "enrollment blocked");
            return Err(EnrollmentError::EnrollmentBlocked {
                student_id: student_id.clone(),
                status: student.academic_status,
            });
        }

        let course = {
            let seat_lock = self.lock_known_course(course_code)?;
            let _seat_guard = seat_lock.lock().unwrap_or_else(PoisonError::into_inner);

            let mut course = self.require_course(course_code)?;

            if course.is_full() {
                debug!(%course_code, capacity = course.capacity, "course full");
                return Err(EnrollmentError::CourseFull {
                    course_code: course_code.clone(),
                    capacity: course.capacity,
                });
            }

            if !self.courses.is_prerequisite_met(student_id, course_code)? {
                debug!(%student_id, %course_code, "prerequisite not met");
                return Err(EnrollmentError::PrerequisiteNotMet {
                    student_id: student_id.clone(),
                    course_code: course_code.clone(),
                });
            }

            course.enrolled_count += 1;
            self.courses.update(course.clone())?;
            course
        };

        let enrollment = Enrollment {
            student_id: student_id.clone(),
            course_code: course_code.clone(),
            status: EnrollmentStatus::Approved,
            enrolled_at: Utc::now(),
        };

        info!(
            %student_id,
            %course_code,
            enrolled = course.enrolled_count,
            capacity = course.capacity,
            "enrollment approved"
        );

        // The seat is already committed; a failed e-mail must not undo it.
        if let Err(error) = self.notify_enrolled(&student, &course) {
            warn!(%student_id, %course_code, %error, "enrollment confirmation not delivered");
        }

        Ok(enrollment)
    }

    /// Release a student's seat in a course.
    pub fn drop_course(
        &self,
        student_id: &StudentId,
        course_code: &CourseCode,
    ) -> Result<(), EnrollmentError> {
        self.require_student(student_id)?;

        let seat_lock = self.lock_known_course(course_code)?;
        let _seat_guard = seat_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut course = self.require_course(course_code)?;

        if course.enrolled_count == 0 {
            warn!(%student_id, %course_code, "drop requested for course with no enrollments");
            return Ok(());
        }

        course.enrolled_count -= 1;
        let remaining = course.enrolled_count;
        self.courses.update(course)?;

        info!(%student_id, %course_code, enrolled = remaining, "course dropped");
        Ok(())
    }

    /// Whether `requested_credits` fits within the student's GPA-derived ceiling (inclusive).
    pub fn validate_credit_limit(
        &self,
        student_id: &StudentId,
        requested_credits: u32,
    ) -> Result<bool, EnrollmentError> {
        let max_credits = self.max_credits(student_id)?;
        Ok(requested_credits <= max_credits)
    }

    /// Credit ceiling for the student's current GPA.
    pub fn max_credits(&self, student_id: &StudentId) -> Result<u32, EnrollmentError> {
        let student = self.require_student(student_id)?;
        let max_credits = self.grades.calculate_max_credits(student.gpa)?;
        Ok(max_credits)
    }

    fn require_student(&self, student_id: &StudentId) -> Result<Student, EnrollmentError> {
        self.students
            .find_by_id(student_id)?
            .ok_or_else(|| EnrollmentError::StudentNotFound(student_id.clone()))
    }

    fn require_course(&self, course_code: &CourseCode) -> Result<Course, EnrollmentError> {
        self.courses
            .find_by_course_code(course_code)?
            .ok_or_else(|| EnrollmentError::CourseNotFound(course_code.clone()))
    }

    /// Seat lock for a course that exists in the catalog.
    ///
    /// Unknown codes fail before a registry entry is created. Callers re-read the
    /// course once the lock is held.
    fn lock_known_course(
        &self,
        course_code: &CourseCode,
    ) -> Result<Arc<Mutex<()>>, EnrollmentError> {
        self.require_course(course_code)?;
        Ok(self.seat_locks.for_course(course_code))
    }

    #[cfg(test)]
    pub(crate) fn tracked_seat_locks(&self) -> usize {
        self.seat_locks.len()
    }

    fn notify_enrolled(&self, student: &Student, course: &Course) -> Result<(), NotificationError> {
        self.notifications.send_email(EmailMessage {
            to: student.email.clone(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            body: format!(
                "Dear {}, you have been enrolled in {} ({}).",
                student.name, course.course_name, course.course_code
            ),
        })
    }
}

/// Registry handing out one mutex per course code.
#[derive(Default)]
struct CourseLocks {
    locks: Mutex<HashMap<CourseCode, Arc<Mutex<()>>>>,
}

impl CourseLocks {
    fn for_course(&self, course_code: &CourseCode) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(course_code.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Error raised by the enrollment service.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("student {0} not found")]
    StudentNotFound(StudentId),
    #[error("course {0} not found")]
    CourseNotFound(CourseCode),
    #[error("student {student_id} cannot enroll while {status}")]
    EnrollmentBlocked {
        student_id: StudentId,
        status: AcademicStatus,
    },
    #[error("course {course_code} is full ({capacity} seats)")]
    CourseFull {
        course_code: CourseCode,
        capacity: u32,
    },
    #[error("student {student_id} has not met the prerequisite for {course_code}")]
    PrerequisiteNotMet {
        student_id: StudentId,
        course_code: CourseCode,
    },
    #[error(transparent)]
    Grading(#[from] GradeError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
