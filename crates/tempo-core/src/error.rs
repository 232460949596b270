//! Error types shared across the Tempo crates.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TempoError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl TempoError {
    /// `true` for [`TempoError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, TempoError::NotFound { .. })
    }
}

pub type TempoResult<T> = Result<T, TempoError>;
