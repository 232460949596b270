//! The session authority: signup, login, credential validation and
//! logout orchestration.

use chrono::{Duration, Utc};
use serde::Serialize;
use tempo_core::error::{TempoError, TempoResult};
use tempo_core::models::profile::{CreateProfile, Profile};
use tempo_core::models::session::CreateSession;
use tempo_core::repository::{ProfileRepository, SessionRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::store;
use crate::token;

/// Successful login result.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutput {
    /// Signed session credential. Returned once; only its hash is stored.
    pub session_token: String,
    pub session_id: Uuid,
    pub profile_id: Uuid,
    /// Credential lifetime in seconds.
    pub expires_in: u64,
}

/// Who a validated credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedProfile {
    pub profile_id: Uuid,
    pub session_id: Uuid,
}

/// Issues, validates and revokes session credentials.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate. A profile may hold any
/// number of concurrent sessions; logging in never revokes older ones.
pub struct SessionAuthority<P: ProfileRepository, S: SessionRepository> {
    profile_repo: P,
    session_repo: S,
    config: AuthConfig,
}

impl<P: ProfileRepository, S: SessionRepository> SessionAuthority<P, S> {
    pub fn new(profile_repo: P, session_repo: S, config: AuthConfig) -> Self {
        Self {
            profile_repo,
            session_repo,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create a profile.
    ///
    /// The email must not be taken. The pre-insert check alone can race
    /// with a concurrent signup; the store's unique email index settles
    /// it and the loser gets [`AuthError::AlreadyExists`].
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Profile, AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::Validation("email is required".into()));
        }
        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::Validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        if !self
            .store(self.profile_repo.find_by_email(email))
            .await?
            .is_empty()
        {
            debug!("Signup rejected, email already registered");
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = self.hash(password).await?;

        let created = self
            .store(self.profile_repo.create(CreateProfile {
                email: email.to_string(),
                username: username.to_string(),
                password_hash,
            }))
            .await;

        match created {
            Ok(profile) => {
                info!(profile_id = %profile.id, "Profile registered");
                Ok(profile)
            }
            Err(TempoError::AlreadyExists { .. }) => Err(AuthError::AlreadyExists),
            Err(err) => {
                // A failed insert may still be a lost race on the email.
                match self.store(self.profile_repo.find_by_email(email)).await {
                    Ok(found) if !found.is_empty() => Err(AuthError::AlreadyExists),
                    _ => Err(err.into()),
                }
            }
        }
    }

    /// Verify email + password and open a new session.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<LoginOutput, AuthError> {
        let profile = self
            .store(self.profile_repo.find_by_email(email))
            .await?
            .into_iter()
            .next()
            .ok_or(AuthError::ProfileDoesNotExist)?;

        if !self.verify(password, &profile.password_hash).await? {
            warn!(profile_id = %profile.id, "Login with wrong password");
            return Err(AuthError::WrongPassword);
        }

        let session_token = token::issue_session_token(profile.id, &self.config)?;
        let expires_at =
            Utc::now() + Duration::seconds(self.config.session_lifetime_secs as i64);

        let session = self
            .store(self.session_repo.create(CreateSession {
                profile_id: profile.id,
                token_hash: token::hash_token(&session_token),
                expires_at,
            }))
            .await?;

        info!(profile_id = %profile.id, session_id = %session.id, "Session opened");

        Ok(LoginOutput {
            session_token,
            session_id: session.id,
            profile_id: profile.id,
            expires_in: self.config.session_lifetime_secs,
        })
    }

    /// Check a credential: signature and expiry first, then the session
    /// record must still exist. Every rejection is
    /// [`AuthError::Unauthorized`].
    pub async fn validate(&self, credential: &str) -> Result<AuthenticatedProfile, AuthError> {
        let claims = token::decode_session_token(credential, &self.config)?;

        let session = match self
            .store(
                self.session_repo
                    .get_by_token_hash(&token::hash_token(credential)),
            )
            .await
        {
            Ok(session) => session,
            Err(err) if err.is_not_found() => {
                debug!("Credential has no live session");
                return Err(AuthError::Unauthorized);
            }
            Err(err) => return Err(err.into()),
        };

        if session.profile_id.to_string() != claims.sub {
            warn!(session_id = %session.id, "Credential subject does not match its session");
            return Err(AuthError::Unauthorized);
        }

        Ok(AuthenticatedProfile {
            profile_id: session.profile_id,
            session_id: session.id,
        })
    }

    /// Revoke the session behind `credential` (logout). Revoking an
    /// unknown or already revoked credential succeeds.
    pub async fn invalidate(&self, credential: &str) -> Result<(), AuthError> {
        self.store(
            self.session_repo
                .delete_by_token_hash(&token::hash_token(credential)),
        )
        .await?;
        debug!("Session revoked");
        Ok(())
    }

    /// Revoke every session of a profile.
    pub async fn invalidate_all(&self, profile_id: Uuid) -> Result<(), AuthError> {
        self.store(self.session_repo.delete_profile_sessions(profile_id))
            .await?;
        info!(%profile_id, "All sessions revoked");
        Ok(())
    }

    /// Look up a profile by id.
    pub async fn profile(&self, profile_id: Uuid) -> Result<Profile, AuthError> {
        Ok(self.store(self.profile_repo.get_by_id(profile_id)).await?)
    }

    async fn store<T>(&self, call: impl Future<Output = TempoResult<T>>) -> TempoResult<T> {
        store::within(self.config.store_timeout, call).await
    }

    /// Argon2 is deliberately slow; keep it off the async workers.
    async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || password::hash_password(&password, &config))
            .await
            .map_err(|e| AuthError::Crypto(format!("hash task: {e}")))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let pepper = self.config.pepper.clone();
        tokio::task::spawn_blocking(move || {
            password::verify_password(&password, &hash, pepper.as_deref())
        })
        .await
        .map_err(|e| AuthError::Crypto(format!("verify task: {e}")))?
    }
}
