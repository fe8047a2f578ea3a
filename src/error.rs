//! Error taxonomy for the analytics engine.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the analytics operations.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("invalid date range {start}..={end}: {reason}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
        reason: String,
    },

    #[error("computation failed: {context}")]
    ComputationFailure {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("data access error: {0}")]
    DataAccess(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

pub fn not_found(entity: &'static str, id: i64) -> AnalyticsError {
    AnalyticsError::NotFound { entity, id }
}

pub fn computation_failure(context: impl Into<String>, source: anyhow::Error) -> AnalyticsError {
    AnalyticsError::ComputationFailure {
        context: context.into(),
        source,
    }
}
