//! The policy generation form endpoint, which gates requests and proxies them to the upstream
//! webhook.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_macros::debug_handler;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::{
    api::{self, auth, captcha, cors},
    upstream, AppState,
};

/// Handles a request to generate a policy. Answers CORS preflights, then runs the request through
/// each enabled gate in order and forwards it upstream if all of them pass.
#[debug_handler]
pub async fn handle(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let origin = &state.config.allowed_origin;

    if method == Method::OPTIONS {
        return cors::preflight(origin);
    }

    match proxy(&state, &method, &headers, body).await {
        Ok(policy) => {
            info!(%method, outcome = "forwarded", "request succeeded");

            (StatusCode::OK, cors::headers(origin), Json(policy)).into_response()
        }
        Err(error) => {
            let status = error.status().as_u16();

            if error.status().is_server_error() {
                error!(%method, status, %error, "request failed");
            } else {
                warn!(%method, status, %error, "request rejected");
            }

            error.into_response()
        }
    }
}

/// Runs the gates after the preflight check, then forwards the sanitized payload upstream and
/// returns its JSON response.
///
/// # Errors
///
/// Returns the error of the first gate that fails, or of the upstream call.
async fn proxy(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Value, api::Error> {
    let config = &state.config;

    if *method != Method::POST {
        return Err(api::Error::MethodNotAllowed);
    }

    if let Some(domain) = &config.referrer_domain {
        auth::check_referrer(headers, domain)?;
    }

    if let Some(api_key) = &config.api_key {
        auth::check_api_key(headers, api_key)?;
    }

    // A body over the size limit is only rejected after the gates above.
    let body = body?;
    let mut payload: Map<String, Value> = serde_json::from_slice(&body)?;

    // The token is only meant for this server, so it never goes upstream even if it's unverified.
    // The remaining fields keep their order.
    let token = payload.shift_remove(captcha::TOKEN_FIELD);

    if let Some(captcha_config) = &config.captcha {
        if let Some(token) = captcha::parse_token(token)? {
            if !captcha::verify(&state.http, captcha_config, &token).await? {
                return Err(api::Error::CaptchaFailed);
            }
        }
    }

    Ok(upstream::forward(&state.http, &config.upstream_url, &payload).await?)
}
