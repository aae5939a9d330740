//! Error types.
//!
//! - [`CurveError`] is what the library returns. Every fit and characterization
//!   is a one-shot computation on static data, so none of these are retried.
//! - [`AppError`] is what the `frc` binary reports: a message plus a process
//!   exit code.

use thiserror::Error;

/// Failures raised while loading, normalizing, sampling or fitting tables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// An expected column is missing from an input table.
    #[error("missing column `{column}` in {table}")]
    Schema { column: String, table: String },

    /// Too few samples for the requested fit, or a degenerate selection window.
    #[error("insufficient data for {context}: need at least {required} samples, got {actual}")]
    InsufficientData {
        context: String,
        required: usize,
        actual: usize,
    },

    /// The least-squares system is singular or underdetermined.
    #[error("least-squares fit failed: {0}")]
    Fit(String),

    /// The nonlinear solver exhausted its iteration budget.
    #[error("nonlinear solver did not converge after {iterations} iterations ({context})")]
    Convergence { context: String, iterations: usize },

    /// Inputs that are malformed rather than merely short (length mismatch, NaN, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CurveError {
    pub fn schema(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::Schema {
            column: column.into(),
            table: table.into(),
        }
    }

    pub fn insufficient(context: impl Into<String>, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            required,
            actual,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Process exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            CurveError::Schema { .. } | CurveError::InvalidInput(_) => 2,
            CurveError::InsufficientData { .. } => 3,
            CurveError::Fit(_) | CurveError::Convergence { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_errors_map_to_exit_codes() {
        let err: AppError = CurveError::schema("speed", "motor curve").into();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "missing column `speed` in motor curve");

        let err: AppError = CurveError::insufficient("stall window", 2, 1).into();
        assert_eq!(err.exit_code(), 3);

        let err: AppError = CurveError::Convergence {
            context: "trip time min".to_string(),
            iterations: 400,
        }
        .into();
        assert_eq!(err.exit_code(), 4);
    }
}
