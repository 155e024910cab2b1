//! See [`verify`].

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    api::{self, validation::CaptchaToken},
    config::CaptchaConfig,
};

/// The request body field carrying the client's reCAPTCHA token.
pub(crate) const TOKEN_FIELD: &str = "recaptcha_token";

/// The verification endpoint's reply.
#[derive(Deserialize, Debug)]
struct Verdict {
    /// Whether the token was valid.
    success: bool,

    /// Why the token was rejected, if it was.
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Interprets the value of the [`TOKEN_FIELD`] taken from a request body.
///
/// An absent, `null`, or empty token means the client didn't send one, so there's nothing to verify.
///
/// # Errors
///
/// Returns [`api::Error::CaptchaFailed`] if the token isn't a string or its length is out of bounds.
pub(crate) fn parse_token(value: Option<Value>) -> Result<Option<CaptchaToken>, api::Error> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(token)) if token.is_empty() => Ok(None),
        Some(Value::String(token)) => CaptchaToken::try_from(token).map(Some).map_err(|error| {
            warn!(%error, "rejected malformed reCAPTCHA token");
            api::Error::CaptchaFailed
        }),
        Some(_) => {
            warn!("rejected non-string reCAPTCHA token");
            Err(api::Error::CaptchaFailed)
        }
    }
}

/// Returns whether a reCAPTCHA token is valid.
///
/// # Errors
///
/// Returns an error if the verification request fails or its response can't be parsed.
pub(crate) async fn verify(
    client: &reqwest::Client,
    config: &CaptchaConfig,
    token: &CaptchaToken,
) -> Result<bool, reqwest::Error> {
    let verdict: Verdict = client
        .post(config.verify_url.clone())
        .form(&[
            ("secret", config.secret_key.as_str()),
            ("response", token.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    info!(
        success = verdict.success,
        error_codes = ?verdict.error_codes,
        "reCAPTCHA verification"
    );

    Ok(verdict.success)
}
