/// Core error types for the request queue
use thiserror::Error;

/// Result type alias using `QueueError`
pub type Result<T> = std::result::Result<T, QueueError>;

/// Coarse classification of a [`QueueError`].
///
/// Front ends map each kind to a distinct user-visible outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    StorageUnavailable,
    NotFound,
    InvalidArgument,
    DecodeFailure,
    RequestInactive,
    Cancelled,
    TimedOut,
}

/// Core error type for the request queue
#[derive(Error, Debug)]
pub enum QueueError {
    /// The persistence layer could not be reached or failed mid-operation
    #[error("Storage unavailable during {operation}: {reason}")]
    StorageUnavailable { operation: String, reason: String },

    /// Operation targeted an id that does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Malformed input, rejected before the store is touched
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A stored record could not be parsed back into its entity shape
    #[error("Failed to decode {entity} {id}: {reason}")]
    DecodeFailure {
        entity: String,
        id: String,
        reason: String,
    },

    /// Mutation attempted on a request that has been deactivated
    #[error("Request {id} is no longer active")]
    RequestInactive { id: String },

    /// The execution context was cancelled before the operation finished
    #[error("Operation {operation} was cancelled")]
    Cancelled { operation: String },

    /// The execution context deadline elapsed before the operation finished
    #[error("Operation {operation} timed out")]
    TimedOut { operation: String },
}

impl QueueError {
    /// Create a storage unavailable error
    pub fn storage_unavailable(operation: impl Into<String>, reason: impl ToString) -> Self {
        Self::StorageUnavailable {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a decode failure error
    pub fn decode_failure(
        entity: impl Into<String>,
        id: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::DecodeFailure {
            entity: entity.into(),
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a request inactive error
    pub fn inactive(id: impl Into<String>) -> Self {
        Self::RequestInactive { id: id.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StorageUnavailable { .. } => ErrorKind::StorageUnavailable,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::DecodeFailure { .. } => ErrorKind::DecodeFailure,
            Self::RequestInactive { .. } => ErrorKind::RequestInactive,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::TimedOut { .. } => ErrorKind::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_names_entity_and_id() {
        let err = QueueError::not_found("DownloadQueueRequest", "abc");
        assert_eq!(err.to_string(), "DownloadQueueRequest not found: abc");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_kinds_are_distinct() {
        let errors = [
            QueueError::storage_unavailable("ping", "connection refused"),
            QueueError::not_found("x", "1"),
            QueueError::invalid_argument("bad"),
            QueueError::decode_failure("x", "1", "bad json"),
            QueueError::inactive("1"),
            QueueError::Cancelled {
                operation: "op".to_string(),
            },
            QueueError::TimedOut {
                operation: "op".to_string(),
            },
        ];

        let kinds: std::collections::HashSet<_> = errors.iter().map(QueueError::kind).collect();
        assert_eq!(kinds.len(), errors.len());
    }
}
