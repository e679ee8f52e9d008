use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use serde_json::Value;

use crate::enrollment::domain::{
    AcademicStatus, Course, CourseCode, CourseGrade, Student, StudentId,
};
use crate::enrollment::repository::{
    CourseRepository, EmailMessage, NotificationError, NotificationService, RepositoryError,
    SmsMessage, StudentRepository,
};
use crate::enrollment::{enrollment_router, EnrollmentService, GradeCalculator};

pub(super) type MemoryService =
    EnrollmentService<MemoryStudents, MemoryCourses, MemoryNotifier, GradeCalculator>;

/// (id, name, gpa, semester) rows shared by the credit-limit scenarios.
pub(super) const STUDENT_TABLE: [(&str, &str, f64, u32); 4] = [
    ("S001", "Park Sungho", 3.8, 5),
    ("S002", "Lee Sanghyeok", 2.6, 4),
    ("S003", "Myung Jaehyun", 2.3, 3),
    ("S004", "Han Taesan", 1.9, 2),
];

pub(super) fn student(id: &str, name: &str, gpa: f64, semester: u32) -> Student {
    let academic_status = GradeCalculator::new()
        .evaluate_standing(&[CourseGrade::new("transcript", 1, gpa)], semester)
        .map(|standing| standing.academic_status)
        .expect("fixture gpa within scale");
    Student {
        student_id: StudentId::new(id),
        name: name.to_string(),
        email: format!("{}@students.siakad.local", id.to_ascii_lowercase()),
        major: "Informatics".to_string(),
        semester,
        gpa,
        academic_status,
    }
}

pub(super) fn suspended_student(id: &str) -> Student {
    let mut student = student(id, "Kim Dohyun", 1.5, 7);
    student.academic_status = AcademicStatus::Suspended;
    student
}

pub(super) fn course(code: &str, name: &str, capacity: u32, enrolled_count: u32) -> Course {
    Course {
        course_code: CourseCode::new(code),
        course_name: name.to_string(),
        capacity,
        enrolled_count,
    }
}

pub(super) fn algorithms() -> Course {
    course("CS101", "Algoritma", 40, 10)
}

pub(super) fn sid(value: &str) -> StudentId {
    StudentId::new(value)
}

pub(super) fn code(value: &str) -> CourseCode {
    CourseCode::new(value)
}

#[derive(Default)]
pub(super) struct MemoryStudents {
    records: Mutex<HashMap<StudentId, Student>>,
}

impl MemoryStudents {
    pub(super) fn with(students: impl IntoIterator<Item = Student>) -> Self {
        let records = students
            .into_iter()
            .map(|student| (student.student_id.clone(), student))
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    pub(super) fn from_table() -> Self {
        Self::with(
            STUDENT_TABLE
                .iter()
                .map(|(id, name, gpa, semester)| student(id, name, *gpa, *semester)),
        )
    }
}

impl StudentRepository for MemoryStudents {
    fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        let guard = self.records.lock().expect("student mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn save(&self, student: Student) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("student mutex poisoned");
        if guard.contains_key(&student.student_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(student.student_id.clone(), student);
        Ok(())
    }

    fn update(&self, student: Student) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("student mutex poisoned");
        guard.insert(student.student_id.clone(), student);
        Ok(())
    }

    fn completed_courses(&self, _id: &StudentId) -> Result<Vec<Course>, RepositoryError> {
        Ok(Vec::new())
    }

    fn delete(&self, id: &StudentId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("student mutex poisoned");
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub(super) struct MemoryCourses {
    records: Mutex<HashMap<CourseCode, Course>>,
    unmet_prerequisites: Mutex<HashSet<(StudentId, CourseCode)>>,
    updates: Mutex<Vec<Course>>,
}

impl MemoryCourses {
    pub(super) fn with(courses: impl IntoIterator<Item = Course>) -> Self {
        let records = courses
            .into_iter()
            .map(|course| (course.course_code.clone(), course))
            .collect();
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub(super) fn block_prerequisite(&self, student_id: &str, course_code: &str) {
        self.unmet_prerequisites
            .lock()
            .expect("prerequisite mutex poisoned")
            .insert((sid(student_id), code(course_code)));
    }

    pub(super) fn enrolled_count(&self, course_code: &str) -> u32 {
        self.records
            .lock()
            .expect("course mutex poisoned")
            .get(&code(course_code))
            .map(|course| course.enrolled_count)
            .expect("course present")
    }

    pub(super) fn updates(&self) -> Vec<Course> {
        self.updates.lock().expect("update mutex poisoned").clone()
    }
}

impl CourseRepository for MemoryCourses {
    fn find_by_course_code(&self, code: &CourseCode) -> Result<Option<Course>, RepositoryError> {
        let guard = self.records.lock().expect("course mutex poisoned");
        Ok(guard.get(code).cloned())
    }

    fn save(&self, course: Course) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("course mutex poisoned");
        guard.insert(course.course_code.clone(), course);
        Ok(())
    }

    fn update(&self, course: Course) -> Result<(), RepositoryError> {
        self.updates
            .lock()
            .expect("update mutex poisoned")
            .push(course.clone());
        let mut guard = self.records.lock().expect("course mutex poisoned");
        guard.insert(course.course_code.clone(), course);
        Ok(())
    }

    fn is_prerequisite_met(
        &self,
        student_id: &StudentId,
        course_code: &CourseCode,
    ) -> Result<bool, RepositoryError> {
        let guard = self
            .unmet_prerequisites
            .lock()
            .expect("prerequisite mutex poisoned");
        Ok(!guard.contains(&(student_id.clone(), course_code.clone())))
    }
}

#[derive(Default)]
pub(super) struct MemoryNotifier {
    emails: Mutex<Vec<EmailMessage>>,
    texts: Mutex<Vec<SmsMessage>>,
}

impl MemoryNotifier {
    pub(super) fn emails(&self) -> Vec<EmailMessage> {
        self.emails.lock().expect("notifier mutex poisoned").clone()
    }

    pub(super) fn texts(&self) -> Vec<SmsMessage> {
        self.texts.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationService for MemoryNotifier {
    fn send_email(&self, message: EmailMessage) -> Result<(), NotificationError> {
        self.emails
            .lock()
            .expect("notifier mutex poisoned")
            .push(message);
        Ok(())
    }

    fn send_sms(&self, message: SmsMessage) -> Result<(), NotificationError> {
        self.texts
            .lock()
            .expect("notifier mutex poisoned")
            .push(message);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl NotificationService for OfflineNotifier {
    fn send_email(&self, _message: EmailMessage) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay offline".to_string()))
    }

    fn send_sms(&self, _message: SmsMessage) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("sms gateway offline".to_string()))
    }
}

pub(super) struct UnavailableCourses;

impl CourseRepository for UnavailableCourses {
    fn find_by_course_code(&self, _code: &CourseCode) -> Result<Option<Course>, RepositoryError> {
        Err(RepositoryError::Unavailable("catalog offline".to_string()))
    }

    fn save(&self, _course: Course) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("catalog offline".to_string()))
    }

    fn update(&self, _course: Course) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("catalog offline".to_string()))
    }

    fn is_prerequisite_met(
        &self,
        _student_id: &StudentId,
        _course_code: &CourseCode,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("catalog offline".to_string()))
    }
}

pub(super) struct Fixture {
    pub(super) service: MemoryService,
    pub(super) courses: Arc<MemoryCourses>,
    pub(super) notifier: Arc<MemoryNotifier>,
}

pub(super) fn build_service(
    students: impl IntoIterator<Item = Student>,
    courses: impl IntoIterator<Item = Course>,
) -> Fixture {
    let students = Arc::new(MemoryStudents::with(students));
    let courses = Arc::new(MemoryCourses::with(courses));
    let notifier = Arc::new(MemoryNotifier::default());
    let service = EnrollmentService::new(
        students,
        courses.clone(),
        notifier.clone(),
        Arc::new(GradeCalculator::new()),
    );
    Fixture {
        service,
        courses,
        notifier,
    }
}

/// Table-backed students plus the `CS101` catalog entry.
pub(super) fn standard_fixture() -> Fixture {
    let students = Arc::new(MemoryStudents::from_table());
    let courses = Arc::new(MemoryCourses::with([algorithms()]));
    let notifier = Arc::new(MemoryNotifier::default());
    let service = EnrollmentService::new(
        students,
        courses.clone(),
        notifier.clone(),
        Arc::new(GradeCalculator::new()),
    );
    Fixture {
        service,
        courses,
        notifier,
    }
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    enrollment_router(Arc::new(service))
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
