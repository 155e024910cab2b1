//! A liveness probe for load balancers.

use axum::Json;
use axum_macros::debug_handler;
use serde::Serialize;

/// A `GET` response body for this API route.
#[derive(Serialize, Debug)]
pub struct GetResponse {
    /// Always `"ok"` while the server is accepting requests.
    pub status: &'static str,
}

/// Reports that the server is up.
#[expect(clippy::unused_async, reason = "Axum route handlers must be async")]
#[debug_handler]
pub async fn get() -> Json<GetResponse> {
    Json(GetResponse { status: "ok" })
}
