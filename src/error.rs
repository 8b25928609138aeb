// src/error.rs
use thiserror::Error;

use crate::models::Tenor;

pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Failures raised by ingestion, bucketing and simulation.
///
/// Missing fields on individual records are not errors; they only exclude
/// the record from the aggregate in question.
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("no instruments to work with: {context}")]
    EmptyInput { context: &'static str },

    #[error("identifier '{identifier}' reappears after its run of rows ended")]
    NonContiguousRun { identifier: String },

    #[error("bucket totals sum to zero, cannot derive a reissuance mix")]
    EmptyDistribution,

    #[error("no interest rate configured for the {tenor} tenor")]
    MissingTenorRate { tenor: Tenor },

    #[error("reissuance mix has no share for the {tenor} tenor")]
    MissingMixShare { tenor: Tenor },

    #[error("horizon year {horizon_year} is before start year {start_year}")]
    InvalidHorizon { start_year: i32, horizon_year: i32 },

    #[error("date arithmetic for '{identifier}' left the supported calendar range")]
    DateOutOfRange { identifier: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("ingest failed: {0}")]
    Ingest(String),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ProjectionError {
    /// Violated preconditions (as opposed to unreadable input).
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ProjectionError::EmptyInput { .. }
                | ProjectionError::NonContiguousRun { .. }
                | ProjectionError::EmptyDistribution
                | ProjectionError::MissingTenorRate { .. }
                | ProjectionError::MissingMixShare { .. }
                | ProjectionError::InvalidHorizon { .. }
                | ProjectionError::InvalidConfig(_)
        )
    }
}
