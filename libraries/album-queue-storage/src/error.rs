/// Storage-specific errors
use album_queue_core::QueueError;
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Conditional write refused because the record was deactivated
    #[error("{entity} {id} is inactive")]
    Inactive { entity: String, id: String },

    /// Input rejected before any query ran
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Stored row could not be mapped back to its entity
    #[error("Failed to decode {entity} {id}: {reason}")]
    Decode {
        entity: String,
        id: String,
        reason: String,
    },

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn inactive(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Inactive {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn decode(entity: impl Into<String>, id: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            entity: entity.into(),
            id: id.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify into the queue error taxonomy, tagging transport failures
    /// with the operation that hit them.
    pub fn into_queue_error(self, operation: &str) -> QueueError {
        match self {
            Self::NotFound { entity, id } => QueueError::NotFound { entity, id },
            Self::Inactive { id, .. } => QueueError::RequestInactive { id },
            Self::InvalidInput(msg) => QueueError::InvalidArgument(msg),
            Self::Decode { entity, id, reason } => QueueError::DecodeFailure { entity, id, reason },
            Self::Serialization(e) => {
                QueueError::storage_unavailable(operation, format!("failed to encode record: {e}"))
            }
            Self::Database(e) => classify_sqlx(operation, e),
            Self::Connection(msg) => QueueError::storage_unavailable(operation, msg),
            Self::Migration(e) => QueueError::storage_unavailable(operation, e),
        }
    }
}

// Slices attach the row id themselves; anything reaching here failed before
// the id column could be read
const UNIDENTIFIED_ROW: &str = "<unknown id>";

fn classify_sqlx(operation: &str, err: sqlx::Error) -> QueueError {
    match err {
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::TypeNotFound { .. } => QueueError::decode_failure(
            "row",
            UNIDENTIFIED_ROW,
            format!("{err} (during {operation})"),
        ),
        other => QueueError::storage_unavailable(operation, other),
    }
}
