use crate::precheck::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssignError {
    #[error("invalid {table} table: {message}")]
    InvalidTable {
        table: &'static str,
        message: String,
    },

    #[error(
        "resident {resident:?} has no usable value for category {category:?} (found {value:?})"
    )]
    UnmappedValue {
        resident: String,
        category: String,
        value: String,
    },

    #[error("category {category:?} has a non-numeric weighting {value:?}")]
    InvalidWeight { category: String, value: String },

    #[error("no feasible pairing: {reason}")]
    Infeasible {
        reason: String,
        diagnostics: Vec<Diagnostic>,
    },

    #[error("solver failed: {0}")]
    Solver(String),
}

impl AssignError {
    pub(crate) fn table(table: &'static str, message: impl Into<String>) -> Self {
        AssignError::InvalidTable {
            table,
            message: message.into(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            AssignError::Infeasible { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, AssignError>;
