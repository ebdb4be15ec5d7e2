//! services/api/src/web/mod.rs
//!
//! HTTP surface of the service: handlers, middleware and the router that
//! wires them together under `/api`.

pub mod activities;
pub mod ai;
pub mod auth;
pub mod extract;
pub mod files;
pub mod health;
pub mod middleware;
pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub use middleware::require_auth;
pub use state::AppState;

/// Request bodies may carry a full 10 MiB document plus JSON overhead.
pub const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

/// CORS for the configured origins; unparsable entries are skipped.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT])
}

/// Builds the complete `/api` router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/health", get(health::health_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/profile", get(auth::profile_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/files/upload", post(files::upload_file_handler))
        .route("/files", get(files::list_files_handler))
        .route("/files/{id}", get(files::get_file_handler))
        .route("/ai/summarize/{file_id}", post(ai::summarize_handler))
        .route("/ai/bullet-points/{file_id}", post(ai::bullet_points_handler))
        .route("/ai/quiz/{file_id}", post(ai::quiz_handler))
        .route("/ai/insights/{file_id}", post(ai::insights_handler))
        .route("/ai/flashcards/{file_id}", post(ai::flashcards_handler))
        .route("/ai/glossary/{file_id}", post(ai::glossary_handler))
        .route("/ai/related-topics/{file_id}", post(ai::related_topics_handler))
        .route("/ai/ask/{file_id}", post(ai::ask_question_handler))
        .route("/activities", get(activities::list_activities_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
