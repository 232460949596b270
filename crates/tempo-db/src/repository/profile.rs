//! SurrealDB implementation of [`ProfileRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tempo_core::error::TempoResult;
use tempo_core::models::profile::{CreateProfile, Profile};
use tempo_core::repository::ProfileRepository;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, is_unique_violation};

/// Row for queries where the id is already known.
#[derive(Debug, SurrealValue)]
struct ProfileRow {
    email: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

/// Row carrying the record id via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ProfileRowWithId {
    record_id: String,
    email: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self, id: Uuid) -> Profile {
        Profile {
            id,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            created_at: self.created_at,
        }
    }
}

impl ProfileRowWithId {
    fn try_into_profile(self) -> Result<Profile, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid profile UUID: {e}")))?;
        Ok(Profile {
            id,
            email: self.email,
            username: self.username,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the profile repository.
#[derive(Clone)]
pub struct SurrealProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ProfileRepository for SurrealProfileRepository<C> {
    async fn create(&self, input: CreateProfile) -> TempoResult<Profile> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('profile', $id) SET \
                 email = $email, \
                 username = $username, \
                 password_hash = $password_hash",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("username", input.username))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| {
            let message = e.to_string();
            if is_unique_violation(&message) {
                debug!(%message, "Profile insert hit unique email index");
                DbError::AlreadyExists {
                    entity: "profile".into(),
                }
            } else {
                DbError::Query(message)
            }
        })?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(id))
    }

    async fn get_by_id(&self, id: Uuid) -> TempoResult<Profile> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('profile', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "profile".into(),
            id: id_str,
        })?;

        Ok(row.into_profile(id))
    }

    async fn find_by_email(&self, email: &str) -> TempoResult<Vec<Profile>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM profile \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;

        let profiles = rows
            .into_iter()
            .map(ProfileRowWithId::try_into_profile)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(profiles)
    }
}
