//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async and every lookup is an exact
//! match on a single named field. Implementations live in `tempo-db`;
//! the session authority only ever sees these traits.

use uuid::Uuid;

use crate::error::TempoResult;
use crate::models::{
    profile::{CreateProfile, Profile},
    session::{CreateSession, Session},
    settings::{Settings, UpsertSettings},
};

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

pub trait ProfileRepository: Send + Sync {
    /// Insert a new profile under a freshly generated id.
    ///
    /// Fails with `AlreadyExists` or `Database` if the store's unique
    /// email index rejects the insert.
    fn create(&self, input: CreateProfile) -> impl Future<Output = TempoResult<Profile>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TempoResult<Profile>> + Send;
    /// All profiles whose email equals `email` (zero or one in a
    /// consistent store).
    fn find_by_email(&self, email: &str) -> impl Future<Output = TempoResult<Vec<Profile>>> + Send;
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = TempoResult<Session>> + Send;
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = TempoResult<Session>> + Send;
    /// Delete the session with this token hash. Deleting a session that
    /// does not exist succeeds.
    fn delete_by_token_hash(&self, token_hash: &str)
    -> impl Future<Output = TempoResult<()>> + Send;
    /// Delete every session belonging to a profile.
    fn delete_profile_sessions(
        &self,
        profile_id: Uuid,
    ) -> impl Future<Output = TempoResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub trait SettingsRepository: Send + Sync {
    fn get_by_profile(&self, profile_id: Uuid)
    -> impl Future<Output = TempoResult<Settings>> + Send;
    /// Insert or replace the settings for a profile. Concurrent writers
    /// race; the last write wins.
    fn upsert(
        &self,
        profile_id: Uuid,
        input: UpsertSettings,
    ) -> impl Future<Output = TempoResult<Settings>> + Send;
}
