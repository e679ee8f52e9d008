//! Course enrollment validation and grading rules for the academic information system.

pub mod config;
pub mod enrollment;
pub mod error;
pub mod telemetry;
