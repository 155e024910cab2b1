//! All routes for the HTTP API.

use axum::{
    routing::{any, get},
    Router,
};

use crate::{
    api::{self, cors},
    AppState,
};

pub mod generate_policy;
pub mod health;

/// Builds the API router around the shared application state.
pub fn router(state: AppState) -> Router {
    let allow_origin = cors::allow_origin_layer(state.config.allowed_origin.clone());

    Router::new()
        // Every method is routed so the handler can answer with its own JSON `405`.
        .route("/generate-policy", any(generate_policy::handle))
        // The path the form used while it was deployed as a Netlify function.
        .route(
            "/.netlify/functions/generate-policy",
            any(generate_policy::handle),
        )
        .route(
            "/health",
            get(health::get).fallback(|| async { api::Error::MethodNotAllowed }),
        )
        .fallback(|| async { api::Error::RouteNotFound })
        .layer(allow_origin)
        .with_state(state)
}
