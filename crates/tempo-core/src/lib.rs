//! Tempo Core — domain models, error types and the repository traits
//! the rest of the workspace is written against.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{TempoError, TempoResult};
