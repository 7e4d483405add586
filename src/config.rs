use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    solver::Solver,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Solver executable, looked up on `PATH` when not a path.
    pub minizinc: PathBuf,
    /// Backend passed as `--solver`; `None` omits the flag.
    pub solver: Option<String>,
    pub time_limit_ms: Option<u64>,
    /// Directory holding both the model file and the generated data file.
    pub work_dir: PathBuf,
    pub model_file: PathBuf,
    pub data_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            minizinc: PathBuf::from("minizinc"),
            solver: Some(String::from("Gecode")),
            time_limit_ms: Some(30000),
            work_dir: PathBuf::from("."),
            model_file: PathBuf::from("Proyecto.mzn"),
            data_file: PathBuf::from("DatosProyecto.dzn"),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_error = |reason: String| Error::Config {
            path: path.to_owned(),
            reason,
        };
        let bytes = fs::read(path).map_err(|err| config_error(err.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|err| config_error(err.to_string()))
    }

    /// Drops the backend and time-limit flags from the solver command line.
    pub fn plain(mut self) -> Self {
        self.solver = None;
        self.time_limit_ms = None;
        self
    }

    pub fn model_path(&self) -> PathBuf {
        self.work_dir.join(&self.model_file)
    }

    pub fn data_path(&self) -> PathBuf {
        self.work_dir.join(&self.data_file)
    }

    pub fn solver(&self) -> Solver {
        Solver::new(&self.minizinc)
            .with_backend(self.solver.clone())
            .with_time_limit(self.time_limit_ms.map(Duration::from_millis))
    }
}
