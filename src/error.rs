//! Crate-level error type.
//!
//! Each concern has its own error enum; [`DrilldownError`] is what crosses
//! the crate boundary. An empty result is never an error.

use crate::config::SettingsError;
use crate::executor::ExecutionError;
use crate::schema::SchemaError;

/// Result type for drill-down operations.
pub type DrilldownResult<T> = Result<T, DrilldownError>;

#[derive(Debug, thiserror::Error)]
pub enum DrilldownError {
    /// A referenced table or field is not declared.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The store failed to run a query.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Results could not be written as JSON.
    #[error("Failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}
