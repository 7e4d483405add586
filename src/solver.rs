use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
    time::Duration,
};

use log::{info, warn};

use crate::{
    error::{Error, Result},
    output::Outcome,
};

/// External constraint solver, invoked as
/// `<program> [--solver <backend>] [--time-limit <ms>] <model> <data>`.
#[derive(Debug, Clone)]
pub struct Solver {
    program: PathBuf,
    backend: Option<String>,
    time_limit: Option<Duration>,
}

impl Solver {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            backend: None,
            time_limit: None,
        }
    }

    pub fn with_backend(mut self, backend: Option<String>) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    /// Runs the no-op version query. Any completed run counts as available,
    /// only a failure to start the program does not.
    pub fn probe(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|source| self.unavailable(source))?;
        if !output.status.success() {
            warn!(
                "{} --version exited with {}",
                self.program.display(),
                output.status
            )
        }
        let version = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_owned();
        info!("found solver {}: {version}", self.program.display());
        Ok(version)
    }

    pub fn args(&self, model: &Path, data: &Path) -> Vec<OsString> {
        let mut args = Vec::new();
        if let Some(backend) = &self.backend {
            args.push("--solver".into());
            args.push(backend.into())
        }
        if let Some(limit) = self.time_limit {
            args.push("--time-limit".into());
            args.push(limit.as_millis().to_string().into())
        }
        args.push(model.into());
        args.push(data.into());
        args
    }

    /// Runs the solver to completion. A nonzero exit is an `Outcome::Failed`, not an error.
    pub fn solve(&self, model: &Path, data: &Path) -> Result<Outcome> {
        if !model.is_file() {
            return Err(Error::MissingModelFile(model.to_owned()));
        }
        let args = self.args(model, data);
        info!(
            "running {} {}",
            self.program.display(),
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| self.unavailable(source))?;
        let outcome = Outcome::from_output(&output);
        if !outcome.is_success() {
            warn!("solver exited with {}", output.status)
        }
        Ok(outcome)
    }

    fn unavailable(&self, source: std::io::Error) -> Error {
        Error::SolverUnavailable {
            program: self.program.clone(),
            source,
        }
    }
}
