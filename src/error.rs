//! Error taxonomy (§7): input validation failures and the two infeasibility
//! outcomes, surfaced through `thiserror` and consumed as `anyhow::Result` at the
//! binary boundary.

use crate::assignment::LabAssignment;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("unknown year prefix '{prefix}' in class name '{class}'")]
    UnknownYearPrefix { class: String, prefix: String },

    #[error("subject '{subject}' is referenced for year '{year}' but absent from course_structure")]
    UnknownSubject { year: String, subject: String },

    #[error("teacher '{teacher}' is referenced but absent from teacher_availability")]
    UnknownTeacher { teacher: String },

    #[error("room restriction for subject '{subject}' references unknown room '{room}'")]
    UnknownRoom { subject: String, room: String },

    #[error("lecture room '{room}' pinned for year '{year}' is not in the configured room set")]
    UnknownLectureRoom { year: String, room: String },

    #[error("lab phase: no feasible or optimal solution found within the solver budget")]
    InfeasibleLab,

    #[error("lecture phase: no feasible or optimal solution found within the solver budget (lab phase succeeded with {} assignments)", .lab_assignments.len())]
    InfeasibleLecture { lab_assignments: Vec<LabAssignment> },
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
