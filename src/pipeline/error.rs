//! Error types for the analysis and preprocessing pipeline.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by dependency tests, rankers, the feature selector and
/// preprocessing transforms.
#[derive(Debug, Error)]
pub enum TabularError {
    /// Input has the wrong shape or format (bad confidence level, unparsable
    /// unit or interval string, invalid split fraction, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A statistical computation could not be carried out on the given data,
    /// e.g. a correlation test on a constant series.
    #[error("computation failed: {0}")]
    Computation(String),

    /// A referenced column does not exist in the dataset.
    #[error("column '{column}' not found in dataset")]
    SchemaMismatch { column: String },

    /// `FeatureSelector::select` was called before `fit`.
    #[error("feature selector is not fitted; call `fit` before `select`")]
    NotFitted,

    /// A preprocessing step failed and aborted the pipeline.
    #[error("preprocessing step '{step}' failed: {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Box<TabularError>,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl TabularError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn computation(message: impl Into<String>) -> Self {
        Self::Computation(message.into())
    }

    pub(crate) fn missing_column(column: &str) -> Self {
        Self::SchemaMismatch {
            column: column.to_string(),
        }
    }
}

/// Result alias used throughout the pipeline module.
pub type Result<T> = std::result::Result<T, TabularError>;
