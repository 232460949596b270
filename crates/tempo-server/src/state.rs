use std::sync::Arc;

use surrealdb::{Connection, Surreal};
use tempo_auth::{AuthConfig, SessionAuthority};
use tempo_db::repository::{
    SurrealProfileRepository, SurrealSessionRepository, SurrealSettingsRepository,
};
use tempo_mail::MailQueue;

pub type Authority<C> = SessionAuthority<SurrealProfileRepository<C>, SurrealSessionRepository<C>>;

/// Shared handler state: one handle per service.
pub struct AppState<C: Connection> {
    pub auth: Authority<C>,
    pub settings: SurrealSettingsRepository<C>,
    pub mail: MailQueue,
}

impl<C: Connection> AppState<C> {
    pub fn new(db: Surreal<C>, auth_config: AuthConfig, mail: MailQueue) -> Arc<Self> {
        Arc::new(Self {
            auth: SessionAuthority::new(
                SurrealProfileRepository::new(db.clone()),
                SurrealSessionRepository::new(db.clone()),
                auth_config,
            ),
            settings: SurrealSettingsRepository::new(db),
            mail,
        })
    }
}
