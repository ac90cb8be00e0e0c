//! Solver adapters. The pipeline only sees [`SolverBackend`]; the HiGHS
//! implementation goes through `good_lp`.

use crate::config::SolverSettings;
use crate::model::{Bound, Model, Sense};
use good_lp::solvers::SolutionStatus;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution as _, SolverModel, constraint,
    default_solver, variable,
};
use log::{debug, info, warn};
use std::fmt;
use std::time::Instant;

/// Per-variable values returned by a backend, in registry order.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    values: Vec<f64>,
    optimal: bool,
}

impl Solution {
    /// A proven optimum.
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            optimal: true,
        }
    }

    /// The best feasible answer found before the solver hit a limit.
    pub fn stopped(values: Vec<f64>) -> Self {
        Self {
            values,
            optimal: false,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.optimal
    }

    /// Whether the binary variable was set to 1.
    pub fn is_selected(&self, var: usize) -> bool {
        self.values.get(var).is_some_and(|v| *v > 0.5)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Infeasible,
    Unbounded,
    /// Stopped at a time, iteration or memory limit with no usable answer.
    Limit,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for SolverFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl From<ResolutionError> for SolverFailure {
    fn from(e: ResolutionError) -> Self {
        let kind = match e {
            ResolutionError::Infeasible => FailureKind::Infeasible,
            ResolutionError::Unbounded => FailureKind::Unbounded,
            _ => FailureKind::Other,
        };
        SolverFailure {
            kind,
            message: e.to_string(),
        }
    }
}

/// Executes a [`Model`]. Implementations own their time and iteration limits
/// and must not return a stopped run as an optimal [`Solution`].
pub trait SolverBackend: Send + Sync {
    fn name(&self) -> &str;

    fn solve(&self, model: &Model) -> Result<Solution, SolverFailure>;
}

/// Solves with the HiGHS MIP solver.
#[derive(Debug, Clone, Default)]
pub struct HighsBackend {
    settings: SolverSettings,
}

impl HighsBackend {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }
}

impl SolverBackend for HighsBackend {
    fn name(&self) -> &str {
        "highs"
    }

    fn solve(&self, model: &Model) -> Result<Solution, SolverFailure> {
        check_empty_rows(model)?;
        if model.num_variables() == 0 {
            return Ok(Solution::new(Vec::new()));
        }

        let start_time = Instant::now();
        let mut problem = ProblemVariables::new();
        let vars = problem.add_vector(variable().binary(), model.num_variables());

        let objective: Expression = model
            .objective()
            .iter()
            .zip(&vars)
            .map(|(coef, var)| *coef * *var)
            .sum();
        let unsolved = match model.sense() {
            Sense::Minimise => problem.minimise(objective),
            Sense::Maximise => problem.maximise(objective),
        };

        let mut highs = unsolved
            .using(default_solver)
            .set_option("threads", self.settings.threads) // 1 thread for reproducibility
            .set_option("random_seed", self.settings.random_seed)
            .set_option("time_limit", self.settings.time_limit_secs)
            .set_option("log_to_console", self.settings.log_to_console);

        for row in model.constraints().iter().filter(|c| !c.terms.is_empty()) {
            let mut lhs = Expression::with_capacity(row.terms.len());
            for (var, coef) in &row.terms {
                lhs.add_mul(*coef, vars[*var]);
            }
            match row.bound {
                Bound::Fixed(rhs) => highs.add_constraint(constraint!(lhs == rhs)),
                Bound::Upper(rhs) => highs.add_constraint(constraint!(lhs <= rhs)),
                Bound::Lower(rhs) => highs.add_constraint(constraint!(lhs >= rhs)),
            };
        }
        debug!(
            "Handing {} variables and {} constraints to HiGHS.",
            vars.len(),
            model.constraints().len()
        );

        info!("Starting ILP solver...");
        let solution = highs.solve()?;
        let values: Vec<f64> = vars.iter().map(|v| solution.value(*v)).collect();
        match solution.status() {
            SolutionStatus::Optimal => {
                info!("Solution found in {:.2?}", start_time.elapsed());
                Ok(Solution::new(values))
            }
            status => {
                let reason = format!(
                    "HiGHS stopped with status {status:?} after {:.2?} (time limit {}s)",
                    start_time.elapsed(),
                    self.settings.time_limit_secs
                );
                incumbent(model, values, &reason)
            }
        }
    }
}

/// Accepts the values of a stopped run only if they form a feasible,
/// non-empty integral assignment.
fn incumbent(model: &Model, values: Vec<f64>, reason: &str) -> Result<Solution, SolverFailure> {
    let limit = |detail: String| SolverFailure {
        kind: FailureKind::Limit,
        message: format!("{reason}; {detail}"),
    };
    if values.iter().any(|v| v.min((v - 1.0).abs()) > 1e-6) {
        return Err(limit("incumbent is not integral".to_string()));
    }
    if let Some(row) = model.violated_by(&values) {
        return Err(limit(format!("no feasible incumbent ({} violated)", row.name)));
    }
    if values.iter().all(|v| *v < 0.5) {
        return Err(limit("no pair was selected".to_string()));
    }
    warn!("{reason}; keeping the best assignment found, which may not be optimal.");
    Ok(Solution::stopped(values))
}

/// Rows without variables are decided before solving: satisfied ones are
/// dropped, violated ones make the model infeasible outright.
fn check_empty_rows(model: &Model) -> Result<(), SolverFailure> {
    match model
        .constraints()
        .iter()
        .find(|c| c.terms.is_empty() && !c.bound.admits(0.0))
    {
        Some(row) => Err(SolverFailure {
            kind: FailureKind::Infeasible,
            message: format!("constraint {} has no variables and cannot be met", row.name),
        }),
        None => Ok(()),
    }
}
