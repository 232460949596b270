use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use surrealdb::Connection;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the application router with all `/api/v1` routes.
pub fn router<C: Connection>(state: Arc<AppState<C>>) -> Router {
    let api = Router::new()
        .route("/signup", post(handlers::signup::<C>))
        .route("/signin", post(handlers::signin::<C>))
        .route("/logout", post(handlers::logout::<C>))
        .route("/logout_all", post(handlers::logout_all::<C>))
        .route("/reset_password", post(handlers::reset_password::<C>))
        .route("/profiles/{profile_id}", get(handlers::get_profile::<C>))
        .route(
            "/profiles/{profile_id}/settings",
            get(handlers::get_settings::<C>).post(handlers::update_settings::<C>),
        );

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
