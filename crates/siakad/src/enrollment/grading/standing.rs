use super::super::domain::AcademicStatus;

const PROBATION_FLOOR: f64 = 2.00;

/// GPA needed to stay `Active` at a given semester.
fn active_threshold(semester: u32) -> f64 {
    match semester {
        1 | 2 => 2.00,
        3 | 4 => 2.25,
        _ => 2.50,
    }
}

/// First-year students are never suspended; later semesters fall to
/// `Suspended` below the probation floor.
pub(super) fn classify(gpa: f64, semester: u32) -> AcademicStatus {
    if gpa >= active_threshold(semester) {
        AcademicStatus::Active
    } else if semester <= 2 || gpa >= PROBATION_FLOOR {
        AcademicStatus::Probation
    } else {
        AcademicStatus::Suspended
    }
}
