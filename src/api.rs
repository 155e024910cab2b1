//! The HTTP API: request gates, the proxy route, and the JSON error contract shared by every
//! response.

pub(crate) mod auth;
pub(crate) mod captcha;
pub(crate) mod cors;
pub mod routes;
pub mod validation;

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
pub use routes::router;
use serde_json::json;
use thiserror::Error;

use crate::upstream;

/// An error handling an API request. Each variant maps to one terminal status of the request
/// pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The request method isn't `POST` (or `OPTIONS`).
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// The request's referrer isn't on the allowed domain.
    #[error("Access denied")]
    AccessDenied,

    /// The request's API key is missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// The request's CAPTCHA token was rejected.
    #[error("reCAPTCHA verification failed")]
    CaptchaFailed,

    /// No route matches the request URI.
    #[error("Not found")]
    RouteNotFound,

    /// The request body isn't a JSON object.
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// The CAPTCHA verification endpoint couldn't be reached or gave an unreadable answer.
    #[error("reCAPTCHA verification request failed: {0}")]
    CaptchaRequest(reqwest::Error),

    /// The request body couldn't be read, e.g. because it's too large.
    #[error("couldn't read request body: {0}")]
    BodyRejected(#[from] BytesRejection),

    /// Forwarding to the upstream webhook failed.
    #[error(transparent)]
    Upstream(#[from] upstream::Error),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        // Like the webhook URL, the verification URL is kept out of error messages.
        Self::CaptchaRequest(error.without_url())
    }
}

impl Error {
    /// Gets the HTTP status code the error responds with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::AccessDenied | Self::CaptchaFailed => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::InvalidBody(_)
            | Self::CaptchaRequest(_)
            | Self::BodyRejected(_)
            | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        // Client errors get only a terse message. Internal errors also get the reason, which never
        // includes secrets or upstream response bodies.
        let body = if status.is_server_error() {
            json!({ "error": "Internal server error", "message": self.to_string() })
        } else {
            json!({ "error": self.to_string() })
        };

        (status, Json(body)).into_response()
    }
}
