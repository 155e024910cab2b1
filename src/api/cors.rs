//! CORS headers for the browser-facing form endpoint.

use axum::{
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderName, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use tower_http::set_header::SetResponseHeaderLayer;

/// The request headers browsers may send.
const ALLOWED_HEADERS: &str = "Content-Type, X-API-Key";

/// The request methods browsers may use.
const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// The full set of CORS headers sent on preflight and success responses.
pub(crate) fn headers(origin: &HeaderValue) -> [(HeaderName, HeaderValue); 3] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone()),
        (
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ),
        (
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ),
    ]
}

/// Responds to a CORS preflight request with an empty body.
pub(crate) fn preflight(origin: &HeaderValue) -> Response {
    (StatusCode::OK, headers(origin)).into_response()
}

/// A layer adding `Access-Control-Allow-Origin` to every response that doesn't already have it,
/// so error responses stay readable from the browser.
pub(crate) fn allow_origin_layer(origin: HeaderValue) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(ACCESS_CONTROL_ALLOW_ORIGIN, origin)
}
