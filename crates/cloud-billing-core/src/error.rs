//! Error types for the core model crate.

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while building or validating model values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Billing month is not in `yyyy-mm` form or names no real month.
    #[error("invalid billing month: {0:?} (expected yyyy-mm)")]
    InvalidBillingMonth(String),

    /// A required field was empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A field was present but out of range.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}
