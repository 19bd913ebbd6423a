use thiserror::Error;

/// Error types for the stemlab library.
///
/// Each module has its own error enum; this aggregates them for callers
/// that cross module boundaries. Note that the formula evaluator's
/// default entry points never return errors at all (failures collapse
/// to the `0.0` fallback), so `Formula` errors only appear on the
/// diagnostic paths.
#[derive(Error, Debug)]
pub enum LabError {
    /// Error while parsing or evaluating a formula.
    #[error("Formula error: {0}")]
    Formula(#[from] crate::formula::FormulaError),

    /// Error in a parameter descriptor or value set.
    #[error("Parameter error: {0}")]
    Parameter(#[from] crate::parameters::ParameterError),

    /// Error in parameter bounds.
    #[error("Bounds error: {0}")]
    Bounds(#[from] crate::parameters::BoundsError),

    /// Error in an AI-generated experiment record.
    #[error("Content error: {0}")]
    Content(#[from] crate::content::ContentError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for cases that don't fit the other categories.
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for stemlab operations.
pub type Result<T> = std::result::Result<T, LabError>;

impl From<String> for LabError {
    fn from(s: String) -> Self {
        LabError::Other(s)
    }
}

impl From<&str> for LabError {
    fn from(s: &str) -> Self {
        LabError::Other(s.to_string())
    }
}
