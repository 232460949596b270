//! Database-specific error types and conversions.

use tempo_core::error::TempoError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },
}

impl From<DbError> for TempoError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TempoError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => TempoError::AlreadyExists { entity },
            other => TempoError::Database(other.to_string()),
        }
    }
}

/// SurrealDB reports unique index violations as
/// "Database index `...` already contains ...".
pub(crate) fn is_unique_violation(message: &str) -> bool {
    message.contains("already contains")
}
