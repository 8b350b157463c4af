// src/error.rs

//! Planner error types.
//!
//! Every failure the core can report to its caller has a named variant.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// The requested SKU has no row in the inventory table.
    #[error("SKU {0} not found in inventory")]
    NotFound(String),

    /// A tabular source is missing, unreadable or malformed.
    #[error("data source '{origin}': {reason}")]
    DataSource { origin: String, reason: String },

    /// The demand model could not be fitted for this SKU.
    #[error("model fit failed for SKU {sku} ({observations} observations): {reason}")]
    Fitting {
        sku: String,
        observations: usize,
        reason: String,
    },

    /// A caller-supplied argument is outside its domain.
    #[error("invalid {param}: {reason}")]
    InvalidInput { param: &'static str, reason: String },
}

impl PlannerError {
    pub(crate) fn data_source(origin: impl Into<String>, reason: impl ToString) -> Self {
        PlannerError::DataSource {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid(param: &'static str, reason: impl Into<String>) -> Self {
        PlannerError::InvalidInput {
            param,
            reason: reason.into(),
        }
    }
}

/// Result type alias for planner operations.
pub type PlannerResult<T> = Result<T, PlannerError>;
