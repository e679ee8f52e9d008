use crate::infra::{parse_grade, seeded_campus, LoggingNotifier};
use clap::Args;
use siakad::enrollment::{
    CourseCode, CourseGrade, EnrollmentError, EnrollmentService, GradeCalculator, StudentId,
};
use siakad::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Requested credit load used for the credit-limit check
    #[arg(long, default_value_t = 21)]
    pub(crate) requested_credits: u32,
    /// Skip the drop step at the end of the walkthrough
    #[arg(long)]
    pub(crate) skip_drop: bool,
}

#[derive(Args, Debug)]
pub(crate) struct GradesArgs {
    /// Current semester (1 or higher)
    #[arg(long)]
    pub(crate) semester: u32,
    /// Completed course as NAME:CREDITS:POINT; repeat for each course
    #[arg(long = "grade", value_parser = parse_grade, required = true)]
    pub(crate) grades: Vec<CourseGrade>,
}

/// Enrollment attempts shown in the demo, chosen to hit every validation branch.
const DEMO_ATTEMPTS: [(&str, &str); 8] = [
    ("S003", "CS201"),
    ("S001", "CS201"),
    ("S002", "CS201"),
    ("S002", "CS101"),
    ("S004", "CS101"),
    ("S002", "CS301"),
    ("S001", "CS999"),
    ("S009", "CS101"),
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        requested_credits,
        skip_drop,
    } = args;

    let campus = seeded_campus().map_err(EnrollmentError::from)?;
    let notifier = Arc::new(LoggingNotifier::new("registrar@siakad.local"));
    let service = EnrollmentService::new(
        campus.students.clone(),
        campus.courses.clone(),
        notifier.clone(),
        Arc::new(GradeCalculator::new()),
    );

    println!("Course enrollment demo");

    println!("\nStudents");
    for student in campus.students.all().map_err(EnrollmentError::from)? {
        println!(
            "- {} {} | semester {} | GPA {:.2} | {}",
            student.student_id, student.name, student.semester, student.gpa, student.academic_status
        );
    }

    print_catalog(&campus.courses.all().map_err(EnrollmentError::from)?);

    println!("\nEnrollment requests");
    for (student_id, course_code) in DEMO_ATTEMPTS {
        let student_id = StudentId::new(student_id);
        let course_code = CourseCode::new(course_code);
        match service.enroll_course(&student_id, &course_code) {
            Ok(enrollment) => println!(
                "- {} -> {}: {} at {}",
                student_id,
                course_code,
                enrollment.status.label(),
                enrollment.enrolled_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            Err(error) => println!("- {} -> {}: rejected ({})", student_id, course_code, error),
        }
    }

    println!("\nCredit limit check ({requested_credits} credits requested)");
    for student in campus.students.all().map_err(EnrollmentError::from)? {
        let max_credits = service.max_credits(&student.student_id)?;
        let allowed = service.validate_credit_limit(&student.student_id, requested_credits)?;
        println!(
            "- {}: max {} -> {}",
            student.student_id,
            max_credits,
            if allowed { "allowed" } else { "over limit" }
        );
    }

    if !skip_drop {
        let student_id = StudentId::new("S001");
        let course_code = CourseCode::new("CS201");
        service.drop_course(&student_id, &course_code)?;
        println!("\n{} dropped {}", student_id, course_code);
    }

    print_catalog(&campus.courses.all().map_err(EnrollmentError::from)?);

    let sent = notifier.sent();
    if sent.is_empty() {
        println!("\nConfirmation e-mails: none");
    } else {
        println!("\nConfirmation e-mails");
        for email in sent {
            println!("- to {}: {} | {}", email.to, email.subject, email.body);
        }
    }

    Ok(())
}

pub(crate) fn run_grades(args: GradesArgs) -> Result<(), AppError> {
    let standing = GradeCalculator::new()
        .evaluate_standing(&args.grades, args.semester)
        .map_err(EnrollmentError::from)?;

    println!("Academic standing (semester {})", standing.semester);
    for grade in &args.grades {
        println!(
            "- {}: {} credits, grade point {:.2}",
            grade.course_name, grade.credits, grade.grade_point
        );
    }
    println!("GPA: {:.2} over {} credits", standing.gpa, standing.total_credits);
    println!("Status: {}", standing.academic_status);
    println!("Maximum credit load: {}", standing.max_credits);

    Ok(())
}

fn print_catalog(courses: &[siakad::enrollment::Course]) {
    println!("\nCatalog");
    for course in courses {
        println!(
            "- {} {}: {}/{} seats taken, {} open",
            course.course_code,
            course.course_name,
            course.enrolled_count,
            course.capacity,
            course.available_seats()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_runs_against_seeded_campus() {
        run_demo(DemoArgs {
            requested_credits: 18,
            skip_drop: false,
        })
        .expect("demo completes");
    }

    #[test]
    fn grades_command_rejects_invalid_transcript() {
        let args = GradesArgs {
            semester: 3,
            grades: vec![CourseGrade::new("Algoritma", 3, 4.5)],
        };

        match run_grades(args) {
            Err(AppError::Enrollment(EnrollmentError::Grading(_))) => {}
            other => panic!("expected grading error, got {other:?}"),
        }
    }

    #[test]
    fn grades_command_summarises_valid_transcript() {
        let args = GradesArgs {
            semester: 2,
            grades: vec![
                CourseGrade::new("Math", 3, 4.0),
                CourseGrade::new("Physics", 3, 3.0),
            ],
        };

        run_grades(args).expect("valid transcript");
    }
}
