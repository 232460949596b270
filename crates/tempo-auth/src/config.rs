//! Authentication configuration.

use std::time::Duration;

/// Configuration for the session authority.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to sign session credentials (HS256).
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Session lifetime in seconds (default: 86_400 = 24 hours).
    pub session_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before hashing.
    pub pepper: Option<String>,
    /// Minimum password length accepted at signup.
    pub min_password_length: usize,
    /// Argon2id memory cost in KiB (default: 19_456 = 19 MiB).
    pub hash_memory_kib: u32,
    /// Argon2id iteration count (default: 2).
    pub hash_iterations: u32,
    /// Upper bound on any single store call.
    pub store_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "tempo".into(),
            session_lifetime_secs: 86_400,
            pepper: None,
            min_password_length: 1,
            hash_memory_kib: 19_456,
            hash_iterations: 2,
            store_timeout: Duration::from_secs(5),
        }
    }
}
