//! Domain models for Tempo.
//!
//! These are the persisted records shared by the store, the session
//! authority and the HTTP layer.

pub mod profile;
pub mod session;
pub mod settings;
