//! Converts line-positional MPL problem files into MiniZinc DZN data files
//! and runs the solver on them.

pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod output;
pub mod session;
pub mod solver;

pub use crate::config::Config;
pub use crate::data::{Mpl, ParseError, ProblemSpec};
pub use crate::error::{Error, Result};
pub use crate::model::{write_dzn, Dzn};
pub use crate::output::{format_solution, Outcome};
pub use crate::session::{Session, Stage};
pub use crate::solver::Solver;
