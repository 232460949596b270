//! Authentication error types.

use tempo_core::error::TempoError;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("profile already exists")]
    AlreadyExists,

    #[error("profile does not exist")]
    ProfileDoesNotExist,

    #[error("wrong password")]
    WrongPassword,

    #[error("unauthorized")]
    Unauthorized,

    #[error("missing or malformed credential")]
    MissingCredential,

    #[error("profile not found")]
    NotFound,

    #[error("validation error: {0}")]
    Validation(String),

    /// The underlying cause is logged where it happens and dropped.
    #[error("storage operation failed")]
    Storage,

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl AuthError {
    /// `true` for the failures a client should only ever see as
    /// "invalid credentials".
    pub fn is_invalid_credentials(&self) -> bool {
        matches!(self, AuthError::ProfileDoesNotExist | AuthError::WrongPassword)
    }
}

impl From<TempoError> for AuthError {
    fn from(err: TempoError) -> Self {
        match err {
            TempoError::AlreadyExists { .. } => AuthError::AlreadyExists,
            TempoError::NotFound { .. } => AuthError::NotFound,
            TempoError::Validation { message } => AuthError::Validation(message),
            other => {
                error!(error = %other, "Store operation failed");
                AuthError::Storage
            }
        }
    }
}
