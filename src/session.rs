use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use log::debug;

use crate::{
    config::Config,
    data::ProblemSpec,
    error::{Error, Result},
    model::write_dzn,
    output::Outcome,
    solver::Solver,
};

/// Progress of the request currently held by a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Parsing,
    Parsed,
    Emitting,
    Emitted,
    Invoking,
    Completed { success: bool },
    Aborted,
}

/// Owns the solver and file locations for the lifetime of the program and
/// runs one conversion request at a time.
pub struct Session {
    solver: Solver,
    model_path: PathBuf,
    data_path: PathBuf,
    stage: Mutex<Stage>,
    in_flight: AtomicBool,
}

impl Session {
    /// Probes the solver first; `Error::SolverUnavailable` means no request can ever succeed.
    pub fn start(config: &Config) -> Result<Self> {
        let session = Self::without_probe(config);
        session.solver.probe()?;
        Ok(session)
    }

    pub fn without_probe(config: &Config) -> Self {
        Self {
            solver: config.solver(),
            model_path: config.model_path(),
            data_path: config.data_path(),
            stage: Mutex::new(Stage::Idle),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn stage(&self) -> Stage {
        match self.stage.lock() {
            Ok(stage) => *stage,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Parses `input` and writes the data file, without invoking the solver.
    pub fn convert(&self, input: Option<&Path>) -> Result<PathBuf> {
        self.request(|| {
            let spec = self.parse(input)?;
            self.emit(&spec)
        })
    }

    /// Full pipeline: parse, emit, invoke.
    pub fn run(&self, input: Option<&Path>) -> Result<Outcome> {
        self.request(|| {
            let spec = self.parse(input)?;
            let data = self.emit(&spec)?;
            self.set_stage(Stage::Invoking);
            let outcome = self.solver.solve(&self.model_path, &data)?;
            self.set_stage(Stage::Completed {
                success: outcome.is_success(),
            });
            Ok(outcome)
        })
    }

    fn request<T>(&self, body: impl FnOnce() -> Result<T>) -> Result<T> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(Error::Busy);
        }
        let _guard = InFlight(&self.in_flight);
        self.set_stage(Stage::Idle);
        let result = body();
        if let Err(err) = &result {
            debug!("request aborted: {err}");
            self.set_stage(Stage::Aborted)
        }
        result
    }

    fn parse(&self, input: Option<&Path>) -> Result<ProblemSpec> {
        let input = input.ok_or(Error::MissingInputPath)?;
        self.set_stage(Stage::Parsing);
        let spec = ProblemSpec::read(input)?;
        self.set_stage(Stage::Parsed);
        Ok(spec)
    }

    fn emit(&self, spec: &ProblemSpec) -> Result<PathBuf> {
        self.set_stage(Stage::Emitting);
        write_dzn(spec, &self.data_path)?;
        self.set_stage(Stage::Emitted);
        Ok(self.data_path.clone())
    }

    fn set_stage(&self, stage: Stage) {
        debug!("stage {stage:?}");
        match self.stage.lock() {
            Ok(mut current) => *current = stage,
            Err(poisoned) => *poisoned.into_inner() = stage,
        }
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release)
    }
}
