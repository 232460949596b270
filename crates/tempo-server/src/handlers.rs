//! Request handlers for `/api/v1`.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use surrealdb::Connection;
use tempo_auth::LoginOutput;
use tempo_auth::store;
use tempo_core::models::profile::Profile;
use tempo_core::models::settings::{Settings, UpsertSettings};
use tempo_core::repository::SettingsRepository;
use tempo_mail::MailJob;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ApiError;
use crate::extract::AuthSession;
use crate::state::AppState;

type Shared<C> = State<Arc<AppState<C>>>;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub msg: String,
}

impl Message {
    fn new(msg: &str) -> Json<Self> {
        Json(Self { msg: msg.into() })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Queued {
    pub msg: String,
    pub job_id: Uuid,
}

pub async fn signup<C: Connection>(
    State(state): Shared<C>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let Json(req) = payload?;
    state
        .auth
        .register(&req.email, &req.password, &req.username)
        .await?;
    Ok(Message::new("Welcome!"))
}

pub async fn signin<C: Connection>(
    State(state): Shared<C>,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> Result<Json<LoginOutput>, ApiError> {
    let Json(req) = payload?;
    let login = state.auth.authenticate(&req.email, &req.password).await?;
    Ok(Json(login))
}

pub async fn logout<C: Connection>(
    State(state): Shared<C>,
    session: AuthSession,
) -> Result<Json<Message>, ApiError> {
    state.auth.invalidate(&session.credential).await?;
    Ok(Message::new("Success"))
}

/// Sign out everywhere: every session of the caller's profile ends,
/// including the one making the request.
pub async fn logout_all<C: Connection>(
    State(state): Shared<C>,
    session: AuthSession,
) -> Result<Json<Message>, ApiError> {
    state.auth.invalidate_all(session.profile_id).await?;
    Ok(Message::new("Success"))
}

/// Queue a password-reset mail for the caller. Admission is all that is
/// reported; delivery happens later on the mail worker.
pub async fn reset_password<C: Connection>(
    State(state): Shared<C>,
    session: AuthSession,
) -> Result<(StatusCode, Json<Queued>), ApiError> {
    let profile = state.auth.profile(session.profile_id).await?;

    let body = format!(
        "Hello {}, a password reset was requested for your Tempo account.",
        profile.username
    );
    let job_id = state.mail.enqueue(MailJob::new(profile.email, body))?;
    info!(profile_id = %profile.id, %job_id, "Password reset mail queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(Queued {
            msg: "Mail queued".into(),
            job_id,
        }),
    ))
}

pub async fn get_profile<C: Connection>(
    State(state): Shared<C>,
    session: AuthSession,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Profile>, ApiError> {
    let Path(profile_id) = path?;
    session.ensure_owner(profile_id)?;
    Ok(Json(state.auth.profile(profile_id).await?))
}

pub async fn get_settings<C: Connection>(
    State(state): Shared<C>,
    session: AuthSession,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Settings>, ApiError> {
    let Path(profile_id) = path?;
    session.ensure_owner(profile_id)?;
    let limit = state.auth.config().store_timeout;
    Ok(Json(
        store::within(limit, state.settings.get_by_profile(profile_id)).await?,
    ))
}

pub async fn update_settings<C: Connection>(
    State(state): Shared<C>,
    session: AuthSession,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpsertSettings>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let Path(profile_id) = path?;
    session.ensure_owner(profile_id)?;
    let Json(input) = payload?;

    let limit = state.auth.config().store_timeout;
    store::within(limit, state.settings.upsert(profile_id, input)).await?;
    debug!(%profile_id, "Settings updated");
    Ok(Message::new("Success update settings"))
}
