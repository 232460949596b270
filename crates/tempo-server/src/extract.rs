use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use surrealdb::Connection;
use tempo_auth::extract_credential;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// A request carrying a credential for a live session.
///
/// Rejects with 401 when the header is missing or malformed, or when
/// the session behind it has ended.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub profile_id: Uuid,
    pub session_id: Uuid,
    pub credential: String,
}

impl AuthSession {
    /// Only the session's own profile may be addressed.
    pub fn ensure_owner(&self, profile_id: Uuid) -> Result<(), ApiError> {
        if self.profile_id == profile_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl<C: Connection> FromRequestParts<Arc<AppState<C>>> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<C>>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let credential = extract_credential(header)?.to_owned();

        let who = state.auth.validate(&credential).await?;

        Ok(Self {
            profile_id: who.profile_id,
            session_id: who.session_id,
            credential,
        })
    }
}
