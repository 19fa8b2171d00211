pub mod auth;
pub mod pages;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::gate;
use crate::state::AppState;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Protected pages, relative to the protected prefix.
fn protected(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(pages::dashboard))
        .route("/invoices", get(pages::invoices))
        .route("/invoices/:id", get(pages::invoice))
        .route("/card", get(pages::card))
        .route("/transactions", get(pages::transactions))
        .route("/rewards", get(pages::rewards))
        .route("/account", get(pages::account))
        .route("/account/password", post(pages::change_password))
        .route("/mutations/:kind", get(pages::mutation_status))
        .route_layer(middleware::from_fn_with_state(state, gate::require_session))
}

/// Build the full application router: health, sign-in/out and the gated pages.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let prefix = state.gate.protected_prefix.clone();

    Router::new()
        .route("/health", get(health))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .nest(&prefix, protected(state.clone()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
