//! Roommate pairing as a binary integer program.
//!
//! Preference tables are normalized into attribute vectors, same-gender pairs
//! are scored by weighted L1 distance, and a model with one binary variable
//! per (pair, room) is handed to a pluggable solver backend (HiGHS by
//! default). The solution is decoded into room assignments.

pub mod backend;
pub mod config;
pub mod data;
pub mod decode;
pub mod error;
pub mod model;
pub mod normalize;
pub mod precheck;
pub mod scoring;
pub mod server;
pub mod solver;
pub mod tables;

pub use backend::{HighsBackend, SolverBackend};
pub use config::Settings;
pub use data::{Assignment, AssignmentInput, AssignmentReport, Cell, Table};
pub use error::{AssignError, Result};
pub use solver::solve;
