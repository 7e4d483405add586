use std::{io, path::PathBuf};

use thiserror::Error;

use crate::data::ParseError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no input file selected")]
    MissingInputPath,

    #[error("failed to read input: {0}")]
    Parse(#[from] ParseError),

    #[error("refusing to write an invalid problem: {0}")]
    InvalidSpec(#[source] ParseError),

    #[error("failed to write data file {}: {source}", path.display())]
    Emit {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("model file {} not found", .0.display())]
    MissingModelFile(PathBuf),

    #[error("solver executable {} is not available: {source}", program.display())]
    SolverUnavailable {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Nonzero solver exit. Displays as the tagged standard-error payload.
    #[error("Error: {stderr}")]
    SolverFailure { code: Option<i32>, stderr: String },

    #[error("a conversion is already in progress")]
    Busy,

    #[error("invalid configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl Error {
    /// Only a missing solver ends the session; everything else leaves it ready for another attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SolverUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
