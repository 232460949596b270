//! SurrealDB repository implementations.

mod profile;
mod session;
mod settings;

pub use profile::SurrealProfileRepository;
pub use session::SurrealSessionRepository;
pub use settings::SurrealSettingsRepository;
