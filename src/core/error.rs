use thiserror::Error;

/// Errors that can occur while building or revising invoices.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BillingError {
    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// The invoice is canceled and can no longer be changed.
    #[error("invoice {0} is canceled and cannot be modified")]
    Canceled(String),

    /// Status and cancellation data of a stored invoice disagree.
    #[error("inconsistent invoice record: {0}")]
    InconsistentRecord(String),
}

/// Rejection reasons of the cancel transition.
///
/// Every variant is a local validation failure: when one is returned the
/// invoice passed in is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancellationError {
    #[error("invoice is already canceled")]
    AlreadyCanceled,

    #[error("cancellation reason must be at least {min} characters (got {actual})")]
    ReasonTooShort { min: usize, actual: usize },

    #[error("cancellation reason must be at most {max} characters (got {actual})")]
    ReasonTooLong { max: usize, actual: usize },
}

/// A single advisory finding with field path, message and a stable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the field (e.g. "line_items[2].quantity").
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// Stable code the UI can map to a localized message (e.g. "DISC-04").
    pub code: &'static str,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.field, self.message)
    }
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }
}
