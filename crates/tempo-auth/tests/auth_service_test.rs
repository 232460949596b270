//! Integration tests for the session authority.

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use tempo_auth::config::AuthConfig;
use tempo_auth::error::AuthError;
use tempo_auth::service::SessionAuthority;
use tempo_auth::token;
use tempo_core::error::TempoResult;
use tempo_core::models::session::{CreateSession, Session};
use tempo_core::repository::{ProfileRepository, SessionRepository};
use tempo_db::repository::{SurrealProfileRepository, SurrealSessionRepository};
use uuid::Uuid;

type Authority = SessionAuthority<SurrealProfileRepository<Db>, SurrealSessionRepository<Db>>;

fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test_secret_key".into(),
        jwt_issuer: "tempo-test".into(),
        // Cheap Argon2 parameters keep the suite fast.
        hash_memory_kib: 1024,
        hash_iterations: 1,
        ..AuthConfig::default()
    }
}

async fn setup() -> (Authority, Surreal<Db>) {
    setup_with(test_config()).await
}

/// Spin up in-memory DB, run migrations and build an authority.
async fn setup_with(config: AuthConfig) -> (Authority, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tempo_db::run_migrations(&db).await.unwrap();

    let authority = SessionAuthority::new(
        SurrealProfileRepository::new(db.clone()),
        SurrealSessionRepository::new(db.clone()),
        config,
    );
    (authority, db)
}

#[tokio::test]
async fn register_then_authenticate() {
    let (svc, _db) = setup().await;

    let profile = svc.register("a@x.com", "pw", "alice").await.unwrap();
    assert_eq!(profile.email, "a@x.com");
    assert_eq!(profile.username, "alice");
    assert_ne!(profile.password_hash, "pw");
    assert!(profile.password_hash.starts_with("$argon2id$"));

    let login = svc.authenticate("a@x.com", "pw").await.unwrap();
    assert!(!login.session_token.is_empty());
    assert_eq!(login.profile_id, profile.id);
    assert_eq!(login.expires_in, 86_400);

    let claims = token::decode_session_token(&login.session_token, &test_config()).unwrap();
    assert_eq!(claims.sub, profile.id.to_string());
}

#[tokio::test]
async fn duplicate_email_already_exists() {
    let (svc, _db) = setup().await;

    svc.register("a@x.com", "pw", "alice").await.unwrap();
    let err = svc.register("a@x.com", "pw2", "alice2").await.unwrap_err();
    assert!(matches!(err, AuthError::AlreadyExists), "got: {err:?}");
}

#[tokio::test]
async fn wrong_password_is_wrong_password() {
    let (svc, _db) = setup().await;
    svc.register("a@x.com", "pw", "alice").await.unwrap();

    let err = svc.authenticate("a@x.com", "wrong").await.unwrap_err();
    assert!(
        matches!(err, AuthError::WrongPassword),
        "expected WrongPassword, got: {err:?}"
    );
    assert!(err.is_invalid_credentials());
}

#[tokio::test]
async fn unknown_email_is_profile_does_not_exist() {
    let (svc, _db) = setup().await;

    let err = svc.authenticate("nobody@x.com", "pw").await.unwrap_err();
    assert!(matches!(err, AuthError::ProfileDoesNotExist), "got: {err:?}");
}

#[tokio::test]
async fn short_password_is_rejected() {
    let (svc, _db) = setup_with(AuthConfig {
        min_password_length: 8,
        ..test_config()
    })
    .await;

    let err = svc.register("a@x.com", "short", "alice").await.unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)), "got: {err:?}");
    assert!(matches!(
        svc.register("", "long-enough", "alice").await,
        Err(AuthError::Validation(_))
    ));
}

#[tokio::test]
async fn every_login_gets_its_own_credential() {
    let (svc, _db) = setup().await;
    svc.register("a@x.com", "pw", "alice").await.unwrap();

    let first = svc.authenticate("a@x.com", "pw").await.unwrap();
    let second = svc.authenticate("a@x.com", "pw").await.unwrap();

    assert_ne!(first.session_token, second.session_token);
    assert_ne!(first.session_id, second.session_id);

    // Older sessions survive newer logins.
    assert!(svc.validate(&first.session_token).await.is_ok());
    assert!(svc.validate(&second.session_token).await.is_ok());
}

#[tokio::test]
async fn validate_then_invalidate() {
    let (svc, _db) = setup().await;
    let profile = svc.register("a@x.com", "pw", "alice").await.unwrap();
    let login = svc.authenticate("a@x.com", "pw").await.unwrap();

    let who = svc.validate(&login.session_token).await.unwrap();
    assert_eq!(who.profile_id, profile.id);
    assert_eq!(who.session_id, login.session_id);

    svc.invalidate(&login.session_token).await.unwrap();

    let err = svc.validate(&login.session_token).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized), "got: {err:?}");

    // Idempotent.
    svc.invalidate(&login.session_token).await.unwrap();
}

#[tokio::test]
async fn signed_token_without_session_is_unauthorized() {
    let (svc, _db) = setup().await;
    let profile = svc.register("a@x.com", "pw", "alice").await.unwrap();

    // Validly signed, never persisted.
    let forged = token::issue_session_token(profile.id, &test_config()).unwrap();
    let err = svc.validate(&forged).await.unwrap_err();
    assert!(matches!(err, AuthError::Unauthorized));
}

#[tokio::test]
async fn foreign_or_garbage_credentials_are_unauthorized() {
    let (svc, _db) = setup().await;
    svc.register("a@x.com", "pw", "alice").await.unwrap();
    svc.authenticate("a@x.com", "pw").await.unwrap();

    let other_config = AuthConfig {
        jwt_secret: "somebody_elses_key".into(),
        ..test_config()
    };
    let foreign = token::issue_session_token(Uuid::new_v4(), &other_config).unwrap();

    for credential in [foreign.as_str(), "", "garbage", "a.b.c"] {
        assert!(
            matches!(svc.validate(credential).await, Err(AuthError::Unauthorized)),
            "expected Unauthorized for {credential:?}"
        );
    }
}

#[tokio::test]
async fn invalidate_all_revokes_every_session() {
    let (svc, _db) = setup().await;
    let profile = svc.register("a@x.com", "pw", "alice").await.unwrap();

    let first = svc.authenticate("a@x.com", "pw").await.unwrap();
    let second = svc.authenticate("a@x.com", "pw").await.unwrap();

    svc.invalidate_all(profile.id).await.unwrap();

    assert!(svc.validate(&first.session_token).await.is_err());
    assert!(svc.validate(&second.session_token).await.is_err());
}

#[tokio::test]
async fn concurrent_signups_leave_one_profile() {
    let (svc, db) = setup().await;

    let (a, b) = tokio::join!(
        svc.register("race@x.com", "pw", "first"),
        svc.register("race@x.com", "pw", "second"),
    );

    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1, "a={a:?} b={b:?}");
    for result in [a, b] {
        if let Err(err) = result {
            assert!(matches!(err, AuthError::AlreadyExists), "got: {err:?}");
        }
    }

    let profiles = SurrealProfileRepository::new(db)
        .find_by_email("race@x.com")
        .await
        .unwrap();
    assert_eq!(profiles.len(), 1);
}

#[tokio::test]
async fn profile_lookup() {
    let (svc, _db) = setup().await;
    let profile = svc.register("a@x.com", "pw", "alice").await.unwrap();

    assert_eq!(svc.profile(profile.id).await.unwrap().email, "a@x.com");
    assert!(matches!(
        svc.profile(Uuid::new_v4()).await,
        Err(AuthError::NotFound)
    ));
}

/// A session store that never answers in time.
struct StalledSessions;

impl SessionRepository for StalledSessions {
    async fn create(&self, _input: CreateSession) -> TempoResult<Session> {
        std::future::pending().await
    }
    async fn get_by_token_hash(&self, _token_hash: &str) -> TempoResult<Session> {
        std::future::pending().await
    }
    async fn delete_by_token_hash(&self, _token_hash: &str) -> TempoResult<()> {
        std::future::pending().await
    }
    async fn delete_profile_sessions(&self, _profile_id: Uuid) -> TempoResult<()> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn store_timeouts_are_storage_errors() {
    let (_svc, db) = setup().await;
    let svc = SessionAuthority::new(
        SurrealProfileRepository::new(db),
        StalledSessions,
        AuthConfig {
            store_timeout: Duration::from_millis(50),
            ..test_config()
        },
    );

    svc.register("a@x.com", "pw", "alice").await.unwrap();

    let err = svc.authenticate("a@x.com", "pw").await.unwrap_err();
    assert!(matches!(err, AuthError::Storage), "got: {err:?}");

    let err = svc.invalidate("whatever").await.unwrap_err();
    assert!(matches!(err, AuthError::Storage), "got: {err:?}");
}
