use crate::store::StoreError;
use thiserror::Error;

/// Generic message shown when storage cannot be reached; the cause is logged.
pub const STORAGE_FAILURE_MESSAGE: &str = "Failed to check observation status. Please try again.";

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("Invalid observation hour: {0:?}")]
    InvalidHourCode(String),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("{0}")]
    DuplicateSubmission(String),
    #[error("{0}")]
    MissingDependency(String),
    #[error("Invalid submission: {0}")]
    InvalidPayload(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] anyhow::Error),
}

impl SlotError {
    /// Message safe to show to the observer. Infrastructure and internal
    /// failures collapse into a generic retry hint.
    pub fn user_message(&self) -> String {
        match self {
            SlotError::StorageUnavailable(_) | SlotError::InvalidTimestamp(_) => {
                STORAGE_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }

    /// True when re-submitting the same hour selection may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SlotError::StorageUnavailable(_))
    }
}

impl From<StoreError> for SlotError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(kind) => {
                SlotError::DuplicateSubmission(kind.duplicate_message().to_string())
            }
            StoreError::Backend(err) => SlotError::StorageUnavailable(err),
        }
    }
}
