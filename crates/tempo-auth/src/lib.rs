//! Tempo Auth — the session authority: password hashing, signed
//! session credentials, credential extraction and the
//! register / authenticate / validate / invalidate flows.

pub mod config;
pub mod error;
pub mod extract;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use extract::extract_credential;
pub use service::{AuthenticatedProfile, LoginOutput, SessionAuthority};
pub use token::SessionClaims;
