use metrics_exporter_prometheus::PrometheusHandle;
use siakad::enrollment::{
    AcademicStatus, Course, CourseCode, CourseGrade, CourseRepository, EmailMessage,
    NotificationError, NotificationService, RepositoryError, SmsMessage, Student, StudentId,
    StudentRepository,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Courses each student has passed, shared by the student and course adapters.
pub(crate) type CompletionLedger = Arc<Mutex<HashMap<StudentId, Vec<Course>>>>;

fn poisoned<T>(_: PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("in-memory store lock poisoned".to_string())
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryStudentRepository {
    records: Arc<Mutex<HashMap<StudentId, Student>>>,
    completions: CompletionLedger,
}

impl InMemoryStudentRepository {
    pub(crate) fn new(completions: CompletionLedger) -> Self {
        Self {
            records: Arc::default(),
            completions,
        }
    }

    pub(crate) fn all(&self) -> Result<Vec<Student>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        let mut students: Vec<Student> = guard.values().cloned().collect();
        students.sort_by(|left, right| left.student_id.cmp(&right.student_id));
        Ok(students)
    }
}

impl StudentRepository for InMemoryStudentRepository {
    fn find_by_id(&self, id: &StudentId) -> Result<Option<Student>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned())
    }

    fn save(&self, student: Student) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&student.student_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(student.student_id.clone(), student);
        Ok(())
    }

    fn update(&self, student: Student) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&student.student_id) {
            guard.insert(student.student_id.clone(), student);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn completed_courses(&self, id: &StudentId) -> Result<Vec<Course>, RepositoryError> {
        let guard = self.completions.lock().map_err(poisoned)?;
        Ok(guard.get(id).cloned().unwrap_or_default())
    }

    fn delete(&self, id: &StudentId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.remove(id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCourseRepository {
    records: Arc<Mutex<HashMap<CourseCode, Course>>>,
    prerequisites: Arc<Mutex<HashMap<CourseCode, Vec<CourseCode>>>>,
    completions: CompletionLedger,
}

impl InMemoryCourseRepository {
    pub(crate) fn new(completions: CompletionLedger) -> Self {
        Self {
            records: Arc::default(),
            prerequisites: Arc::default(),
            completions,
        }
    }

    pub(crate) fn require(
        &self,
        course_code: CourseCode,
        prerequisite: CourseCode,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.prerequisites.lock().map_err(poisoned)?;
        guard.entry(course_code).or_default().push(prerequisite);
        Ok(())
    }

    pub(crate) fn all(&self) -> Result<Vec<Course>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        let mut courses: Vec<Course> = guard.values().cloned().collect();
        courses.sort_by(|left, right| left.course_code.cmp(&right.course_code));
        Ok(courses)
    }
}

impl CourseRepository for InMemoryCourseRepository {
    fn find_by_course_code(&self, code: &CourseCode) -> Result<Option<Course>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(code).cloned())
    }

    fn save(&self, course: Course) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&course.course_code) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(course.course_code.clone(), course);
        Ok(())
    }

    fn update(&self, course: Course) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&course.course_code) {
            guard.insert(course.course_code.clone(), course);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn is_prerequisite_met(
        &self,
        student_id: &StudentId,
        course_code: &CourseCode,
    ) -> Result<bool, RepositoryError> {
        let required = {
            let guard = self.prerequisites.lock().map_err(poisoned)?;
            guard.get(course_code).cloned().unwrap_or_default()
        };
        if required.is_empty() {
            return Ok(true);
        }

        let completions = self.completions.lock().map_err(poisoned)?;
        let passed = completions.get(student_id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(required
            .iter()
            .all(|code| passed.iter().any(|course| &course.course_code == code)))
    }
}

/// Notifier that writes messages to the log and keeps an outbox for inspection.
#[derive(Clone)]
pub(crate) struct LoggingNotifier {
    sender: String,
    outbox: Arc<Mutex<Vec<EmailMessage>>>,
}

impl LoggingNotifier {
    pub(crate) fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            outbox: Arc::default(),
        }
    }

    pub(crate) fn sent(&self) -> Vec<EmailMessage> {
        self.outbox
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NotificationService for LoggingNotifier {
    fn send_email(&self, message: EmailMessage) -> Result<(), NotificationError> {
        if !message.to.contains('@') {
            return Err(NotificationError::InvalidRecipient(message.to));
        }
        info!(from = %self.sender, to = %message.to, subject = %message.subject, "email dispatched");
        self.outbox
            .lock()
            .map_err(|_| NotificationError::Transport("outbox lock poisoned".to_string()))?
            .push(message);
        Ok(())
    }

    fn send_sms(&self, message: SmsMessage) -> Result<(), NotificationError> {
        if message.phone.trim().is_empty() {
            return Err(NotificationError::InvalidRecipient(message.phone));
        }
        info!(to = %message.phone, "sms dispatched");
        Ok(())
    }
}

/// Repositories preloaded with a small catalog and cohort for local runs.
pub(crate) struct SeededCampus {
    pub(crate) students: Arc<InMemoryStudentRepository>,
    pub(crate) courses: Arc<InMemoryCourseRepository>,
}

pub(crate) fn seeded_campus() -> Result<SeededCampus, RepositoryError> {
    let completions = CompletionLedger::default();
    let students = Arc::new(InMemoryStudentRepository::new(completions.clone()));
    let courses = Arc::new(InMemoryCourseRepository::new(completions.clone()));

    let cohort = [
        ("S001", "Park Sungho", 5, 3.8, AcademicStatus::Active),
        ("S002", "Lee Sanghyeok", 4, 2.6, AcademicStatus::Active),
        ("S003", "Myung Jaehyun", 3, 2.1, AcademicStatus::Probation),
        ("S004", "Han Taesan", 6, 1.9, AcademicStatus::Suspended),
    ];
    for (id, name, semester, gpa, academic_status) in cohort {
        students.save(Student {
            student_id: StudentId::new(id),
            name: name.to_string(),
            email: format!("{}@students.siakad.local", id.to_ascii_lowercase()),
            major: "Informatika".to_string(),
            semester,
            gpa,
            academic_status,
        })?;
    }

    let catalog = [
        ("CS101", "Algoritma", 40, 10),
        ("CS201", "Struktur Data", 35, 34),
        ("CS301", "Sistem Operasi", 30, 30),
    ];
    for (code, name, capacity, enrolled_count) in catalog {
        courses.save(Course {
            course_code: CourseCode::new(code),
            course_name: name.to_string(),
            capacity,
            enrolled_count,
        })?;
    }

    courses.require(CourseCode::new("CS201"), CourseCode::new("CS101"))?;
    courses.require(CourseCode::new("CS301"), CourseCode::new("CS201"))?;

    if let Some(cs101) = courses.find_by_course_code(&CourseCode::new("CS101"))? {
        let mut ledger = completions.lock().map_err(poisoned)?;
        ledger.insert(StudentId::new("S001"), vec![cs101.clone()]);
        ledger.insert(StudentId::new("S002"), vec![cs101]);
    }

    Ok(SeededCampus { students, courses })
}

/// Parse `NAME:CREDITS:POINT`, e.g. `Algoritma:3:3.7`.
pub(crate) fn parse_grade(raw: &str) -> Result<CourseGrade, String> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(point), Some(credits), Some(name)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected NAME:CREDITS:POINT, got '{raw}'"));
    };

    let credits = credits
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid credit count in '{raw}' ({err})"))?;
    let grade_point = point
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid grade point in '{raw}' ({err})"))?;

    Ok(CourseGrade::new(name.trim(), credits, grade_point))
}
