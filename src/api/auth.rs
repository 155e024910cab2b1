//! Various API utilities to help with authentication and authorization.

use axum::http::{header::REFERER, HeaderMap, HeaderName};
use tracing::warn;

use crate::api;

/// The misspelling-corrected variant of `Referer` some clients send instead.
static REFERRER: HeaderName = HeaderName::from_static("referrer");

/// The header carrying the client's API key.
static X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Returns the request's referrer, preferring `Referer` over `Referrer`. Missing, empty, and
/// non-ASCII values all count as no referrer.
fn referrer(headers: &HeaderMap) -> &str {
    [&REFERER, &REFERRER]
        .into_iter()
        .filter_map(|name| headers.get(name)?.to_str().ok())
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Checks that the request was made from a page on the allowed domain.
///
/// # Errors
///
/// Returns [`api::Error::AccessDenied`] if the referrer doesn't contain `domain`.
pub(crate) fn check_referrer(headers: &HeaderMap, domain: &str) -> Result<(), api::Error> {
    let referrer = referrer(headers);

    if !referrer.contains(domain) {
        warn!(referrer, "blocked request with invalid referrer");
        return Err(api::Error::AccessDenied);
    }

    Ok(())
}

/// Checks that the request carries the expected API key.
///
/// # Errors
///
/// Returns [`api::Error::Unauthorized`] if the key is missing or wrong.
pub(crate) fn check_api_key(headers: &HeaderMap, expected: &str) -> Result<(), api::Error> {
    let matches = headers
        .get(&X_API_KEY)
        .is_some_and(|key| key.as_bytes() == expected.as_bytes());

    if !matches {
        warn!(
            present = headers.contains_key(&X_API_KEY),
            "blocked request with invalid or missing API key"
        );
        return Err(api::Error::Unauthorized);
    }

    Ok(())
}
