//! Session credential issuance and verification.
//!
//! A credential is an HS256-signed JWT. It is self-contained (the
//! signature and `exp` are checked without the store), but the session
//! authority additionally requires a live session record whose
//! `token_hash` equals [`hash_token`] of the credential.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Claims embedded in every session credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: profile ID (UUID string).
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID; makes every credential string distinct.
    pub jti: String,
}

/// Issue a signed credential for `profile_id`.
pub fn issue_session_token(profile_id: Uuid, config: &AuthConfig) -> Result<String, AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::Crypto("JWT secret is not configured".into()));
    }

    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: profile_id.to_string(),
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + config.session_lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Verify signature, issuer and expiry of a credential.
///
/// Any failure (bad signature, wrong algorithm, expiry, malformed input
/// or a non-UUID subject) is reported as [`AuthError::Unauthorized`].
pub fn decode_session_token(token: &str, config: &AuthConfig) -> Result<SessionClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    let claims = jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("Session credential expired"),
                _ => tracing::debug!(error = %e, "Session credential rejected"),
            }
            AuthError::Unauthorized
        })?;

    Uuid::parse_str(&claims.sub).map_err(|_| AuthError::Unauthorized)?;
    Ok(claims)
}

/// SHA-256 of a raw credential, hex-encoded.
///
/// This is the value stored as `session.token_hash`.
pub fn hash_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}
