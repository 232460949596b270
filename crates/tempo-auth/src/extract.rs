//! Pulling the credential out of an inbound request.
//!
//! The only accepted transport is the `Authorization` header in the
//! form `Bearer <token>`. This module works on the raw header value so
//! it stays independent of any HTTP framework.

use crate::error::AuthError;

const BEARER_SCHEME: &str = "Bearer";

/// Extract the credential from an `Authorization` header value.
///
/// `None` (header absent or not valid UTF-8), a token count other than
/// two, a scheme other than `Bearer`, or an empty token all yield
/// [`AuthError::MissingCredential`].
pub fn extract_credential(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.ok_or(AuthError::MissingCredential)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
            Ok(token)
        }
        _ => Err(AuthError::MissingCredential),
    }
}
