//! A gatekeeping proxy for the policy generation form. Requests from the website pass a fixed set
//! of gates (CORS, referrer, API key, and reCAPTCHA) before their payload is forwarded to the
//! upstream webhook that generates the policy.

pub mod api;
pub mod config;
pub mod upstream;

use std::sync::Arc;

pub use config::Config;

/// The state shared by every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The configuration loaded at start-up. Never mutated.
    pub config: Arc<Config>,

    /// The HTTP client for outbound requests, sharing one connection pool.
    pub http: reqwest::Client,
}

impl AppState {
    /// Constructs the state, building an HTTP client that respects the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client can't be initialized (e.g. no TLS backend is available).
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let mut http = reqwest::Client::builder();

        if let Some(timeout) = config.upstream_timeout {
            http = http.timeout(timeout);
        }

        Ok(Self {
            config: Arc::new(config),
            http: http.build()?,
        })
    }
}
