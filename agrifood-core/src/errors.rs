use crate::items::ItemId;
use crate::timeseries::Year;
use thiserror::Error;

/// Error type for invalid operations.
///
/// Any of these aborts a scenario evaluation. Recoverable configuration
/// problems are reported through [`crate::outcome::Outcome::Degraded`] instead.
#[derive(Error, Debug)]
pub enum AgrifoodError {
    #[error("{0}")]
    Error(String),
    #[error("Item {0} not found")]
    ItemNotFound(ItemId),
    #[error("Item {0} already exists")]
    DuplicateItem(ItemId),
    #[error("Land map '{0}' not found")]
    LandMapNotFound(String),
    #[error("Year {year} is outside of the {context} year range")]
    YearNotFound { year: Year, context: String },
    #[error("Missing upstream data: {0}")]
    MissingData(String),
    #[error("Shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        context: String,
        expected: String,
        got: String,
    },
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("Step '{step}' ({phase}) cannot run after a {previous} step")]
    PhaseOrder {
        step: String,
        phase: String,
        previous: String,
    },
    #[error("Serialization failed: {0}")]
    Serialization(String),
    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Box<AgrifoodError>,
    },
}

impl AgrifoodError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        AgrifoodError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn shape_mismatch(
        context: &str,
        expected: impl std::fmt::Debug,
        got: impl std::fmt::Debug,
    ) -> Self {
        AgrifoodError::ShapeMismatch {
            context: context.to_string(),
            expected: format!("{:?}", expected),
            got: format!("{:?}", got),
        }
    }
}

/// Convenience type for `Result<T, AgrifoodError>`.
pub type AgrifoodResult<T> = Result<T, AgrifoodError>;
