//! Grade-point arithmetic and the eligibility rules derived from it.
//!
//! Everything here is pure: no repository access and no interior state, so a
//! single [`GradeCalculator`] can be shared freely across threads.

mod credits;
mod standing;

use serde::{Deserialize, Serialize};

use super::domain::{AcademicStatus, CourseGrade};

pub use credits::{MAX_CREDIT_LOAD, MIN_CREDIT_LOAD};

pub const MIN_GRADE_POINT: f64 = 0.0;
pub const MAX_GRADE_POINT: f64 = 4.0;

/// Rules consulted by the enrollment service for GPA-driven decisions.
pub trait GradeRules: Send + Sync {
    /// Credit-weighted mean of grade points; absent or empty input yields 0.0.
    fn calculate_gpa(&self, grades: Option<&[CourseGrade]>) -> Result<f64, GradeError>;

    fn determine_academic_status(
        &self,
        gpa: f64,
        semester: u32,
    ) -> Result<AcademicStatus, GradeError>;

    fn calculate_max_credits(&self, gpa: f64) -> Result<u32, GradeError>;
}

/// Stateless calculator implementing the university grading policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradeCalculator;

impl GradeCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Compute GPA, standing, and credit ceiling for a transcript in one pass.
    pub fn evaluate_standing(
        &self,
        grades: &[CourseGrade],
        semester: u32,
    ) -> Result<AcademicStanding, GradeError> {
        let gpa = self.calculate_gpa(Some(grades))?;
        let academic_status = self.determine_academic_status(gpa, semester)?;
        let max_credits = self.calculate_max_credits(gpa)?;

        Ok(AcademicStanding {
            gpa: (gpa * 100.0).round() / 100.0,
            semester,
            academic_status,
            max_credits,
            total_credits: grades.iter().map(|grade| u64::from(grade.credits)).sum(),
        })
    }
}

impl GradeRules for GradeCalculator {
    fn calculate_gpa(&self, grades: Option<&[CourseGrade]>) -> Result<f64, GradeError> {
        let grades = match grades {
            Some(grades) if !grades.is_empty() => grades,
            _ => return Ok(0.0),
        };

        if let Some(invalid) = grades
            .iter()
            .find(|grade| !is_within_scale(grade.grade_point))
        {
            return Err(GradeError::InvalidGrade {
                course_name: invalid.course_name.clone(),
                grade_point: invalid.grade_point,
            });
        }

        let (weighted, credits) = grades.iter().fold((0.0_f64, 0_u64), |(sum, total), grade| {
            (
                sum + grade.grade_point * f64::from(grade.credits),
                total + u64::from(grade.credits),
            )
        });

        if credits == 0 {
            return Ok(0.0);
        }

        Ok(weighted / credits as f64)
    }

    fn determine_academic_status(
        &self,
        gpa: f64,
        semester: u32,
    ) -> Result<AcademicStatus, GradeError> {
        ensure_gpa(gpa)?;
        if semester < 1 {
            return Err(GradeError::InvalidArgument(format!(
                "semester must be at least 1, got {semester}"
            )));
        }
        Ok(standing::classify(gpa, semester))
    }

    fn calculate_max_credits(&self, gpa: f64) -> Result<u32, GradeError> {
        ensure_gpa(gpa)?;
        Ok(credits::ceiling_for(gpa))
    }
}

/// Combined transcript summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicStanding {
    pub gpa: f64,
    pub semester: u32,
    pub academic_status: AcademicStatus,
    pub max_credits: u32,
    pub total_credits: u64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradeError {
    #[error("Invalid grade point {grade_point} for {course_name}: must be between 0.0 and 4.0")]
    InvalidGrade { course_name: String, grade_point: f64 },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

fn is_within_scale(value: f64) -> bool {
    (MIN_GRADE_POINT..=MAX_GRADE_POINT).contains(&value)
}

fn ensure_gpa(gpa: f64) -> Result<(), GradeError> {
    if is_within_scale(gpa) {
        Ok(())
    } else {
        Err(GradeError::InvalidArgument(format!(
            "GPA must be between 0.0 and 4.0, got {gpa}"
        )))
    }
}
