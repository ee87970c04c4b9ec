use thiserror::Error;

use crate::korean_school::error::SchoolError;

#[derive(Debug, Error)]
pub enum SkillError {
    #[error(transparent)]
    School(#[from] SchoolError),

    #[error("no school named {name} in {office}")]
    SchoolNotFound { office: String, name: String },

    #[error("no timetable for grade {grade} class {room}")]
    ClassNotFound { grade: usize, room: usize },

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}
