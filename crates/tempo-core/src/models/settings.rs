//! Per-profile settings document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored under the owning profile's id, so a profile has at most one
/// settings document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub profile_id: Uuid,
    pub activity_categories: Vec<String>,
    pub tracked_sites: Vec<String>,
    pub notify_need_start: bool,
    pub notify_need_finish: bool,
    pub enable_sound_notify: bool,
    pub enable_popup_notify: bool,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of a profile's settings. Missing fields take their
/// default values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct UpsertSettings {
    pub activity_categories: Vec<String>,
    pub tracked_sites: Vec<String>,
    pub notify_need_start: bool,
    pub notify_need_finish: bool,
    pub enable_sound_notify: bool,
    pub enable_popup_notify: bool,
}
