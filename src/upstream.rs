//! Forwarding accepted form payloads to the upstream webhook, which generates the actual policy.

use reqwest::{StatusCode, Url};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// How many characters of the upstream's raw response body are logged on success.
const RAW_RESPONSE_LOG_CHARS: usize = 500;

/// An error forwarding a payload upstream.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The request couldn't be sent, or its response body couldn't be read.
    #[error("upstream webhook request failed: {0}")]
    Request(reqwest::Error),

    /// The upstream responded with a non-2xx status.
    #[error("upstream webhook failed: {}", .0.as_u16())]
    Status(StatusCode),

    /// The upstream's response body wasn't JSON.
    #[error("invalid JSON response from upstream webhook")]
    InvalidJson(#[source] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        // The webhook URL is a secret, so it's kept out of error messages.
        Self::Request(error.without_url())
    }
}

/// Posts `payload` as JSON to the webhook at `url`, returning its parsed JSON response.
///
/// # Errors
///
/// See [`Error`].
pub async fn forward(
    client: &reqwest::Client,
    url: &Url,
    payload: &Map<String, Value>,
) -> Result<Value, Error> {
    info!("proxying request to upstream webhook");

    let response = client.post(url.clone()).json(payload).send().await?;

    let status = response.status();
    if !status.is_success() {
        warn!(status = status.as_u16(), "upstream webhook rejected request");
        return Err(Error::Status(status));
    }

    // The body is read as text first so it can be logged even if it isn't valid JSON.
    let text = response.text().await?;
    debug!(raw = truncate(&text, RAW_RESPONSE_LOG_CHARS), "upstream webhook raw response");

    serde_json::from_str(&text).map_err(|source| {
        error!(%source, response = %text, "upstream webhook returned invalid JSON");
        Error::InvalidJson(source)
    })
}

/// Returns at most the first `max_chars` characters of `text`.
fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
