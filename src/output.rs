use std::process::Output;

use crate::error::Error;

/// What a finished solver run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Solved { stdout: String },
    Failed { code: Option<i32>, stderr: String },
}

impl Outcome {
    pub fn from_output(output: &Output) -> Self {
        if output.status.success() {
            Self::Solved {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            }
        } else {
            Self::Failed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Solved { .. })
    }

    /// Text surfaced to the user.
    pub fn render(&self) -> String {
        match self {
            Self::Solved { stdout } => format_solution(stdout),
            Self::Failed { code, stderr } => Error::SolverFailure {
                code: *code,
                stderr: stderr.clone(),
            }
            .to_string(),
        }
    }
}

/// Strips quotes and surrounding whitespace from every line and drops the empty ones.
pub fn format_solution(stdout: &str) -> String {
    let mut formatted = String::new();
    for line in stdout.split('\n') {
        let line = line.replace('"', "");
        let line = line.trim();
        if !line.is_empty() {
            formatted.push_str(line);
            formatted.push('\n');
        }
    }
    formatted
}
