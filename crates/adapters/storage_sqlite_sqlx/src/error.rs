//! Storage-specific error type wrapping sqlx errors.

use flowmail_domain::error::{FlowMailError, ValidationError};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to serialize a graph to JSON.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for FlowMailError {
    fn from(err: StorageError) -> Self {
        match err {
            // The name column is the only unique constraint besides primary keys,
            // and those are freshly generated uuids.
            StorageError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                ValidationError::DuplicateName.into()
            }
            other => Self::Storage(Box::new(other)),
        }
    }
}
