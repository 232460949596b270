//! Tempo Database — SurrealDB connection management, schema migrations
//! and implementations of the `tempo-core` repository traits.
//!
//! Repositories are generic over [`surrealdb::Connection`] so the same
//! code runs against a remote server and the in-memory engine.

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::run_migrations;
