//! SurrealDB implementation of [`SettingsRepository`].
//!
//! A profile's settings are stored as `settings:<profile_id>`, so the
//! upsert is a single statement against a known record id. Two writers
//! racing on the same profile both succeed; whichever statement the
//! store applies last is what remains.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tempo_core::error::TempoResult;
use tempo_core::models::settings::{Settings, UpsertSettings};
use tempo_core::repository::SettingsRepository;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SettingsRow {
    activity_categories: Vec<String>,
    tracked_sites: Vec<String>,
    notify_need_start: bool,
    notify_need_finish: bool,
    enable_sound_notify: bool,
    enable_popup_notify: bool,
    updated_at: DateTime<Utc>,
}

impl SettingsRow {
    fn into_settings(self, profile_id: Uuid) -> Settings {
        Settings {
            profile_id,
            activity_categories: self.activity_categories,
            tracked_sites: self.tracked_sites,
            notify_need_start: self.notify_need_start,
            notify_need_finish: self.notify_need_finish,
            enable_sound_notify: self.enable_sound_notify,
            enable_popup_notify: self.enable_popup_notify,
            updated_at: self.updated_at,
        }
    }
}

/// SurrealDB implementation of the settings repository.
#[derive(Clone)]
pub struct SurrealSettingsRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSettingsRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SettingsRepository for SurrealSettingsRepository<C> {
    async fn get_by_profile(&self, profile_id: Uuid) -> TempoResult<Settings> {
        let id_str = profile_id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('settings', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SettingsRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "settings".into(),
            id: id_str,
        })?;

        Ok(row.into_settings(profile_id))
    }

    async fn upsert(&self, profile_id: Uuid, input: UpsertSettings) -> TempoResult<Settings> {
        let id_str = profile_id.to_string();

        let result = self
            .db
            .query(
                "UPSERT type::record('settings', $id) SET \
                 profile_id = $id, \
                 activity_categories = $activity_categories, \
                 tracked_sites = $tracked_sites, \
                 notify_need_start = $notify_need_start, \
                 notify_need_finish = $notify_need_finish, \
                 enable_sound_notify = $enable_sound_notify, \
                 enable_popup_notify = $enable_popup_notify, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("activity_categories", input.activity_categories))
            .bind(("tracked_sites", input.tracked_sites))
            .bind(("notify_need_start", input.notify_need_start))
            .bind(("notify_need_finish", input.notify_need_finish))
            .bind(("enable_sound_notify", input.enable_sound_notify))
            .bind(("enable_popup_notify", input.enable_popup_notify))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SettingsRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "settings".into(),
            id: id_str,
        })?;

        Ok(row.into_settings(profile_id))
    }
}
