//! Common code for integration tests

#![expect(
    clippy::allow_attributes,
    reason = "`dead_code` isn't always expected, since not every test file uses every helper"
)]
#![allow(dead_code, reason = "not every test file uses every helper")]

use std::collections::HashMap;

use anyhow::Error;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use gatekeeper::{api, AppState, Config};
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

/// The API key test requests authenticate with.
pub const API_KEY: &str = "test-api-key";

/// The reCAPTCHA secret the server is configured with.
pub const RECAPTCHA_SECRET: &str = "test-recaptcha-secret";

/// The origin the server allows.
pub const ORIGIN: &str = "https://www.finokapi.com";

/// The path of the upstream webhook on its mock server.
pub const WEBHOOK_PATH: &str = "/webhook/policy";

/// The path of the reCAPTCHA verification endpoint on its mock server.
pub const SITEVERIFY_PATH: &str = "/recaptcha/api/siteverify";

/// A server under test, with mocks standing in for both outbound endpoints.
pub struct TestApp {
    /// The router handling requests.
    pub router: Router,

    /// The mock reCAPTCHA verification endpoint.
    pub captcha: MockServer,

    /// The mock upstream webhook.
    pub upstream: MockServer,
}

/// A response from the server under test.
#[derive(Debug)]
pub struct TestResponse {
    /// The status code.
    pub status: StatusCode,

    /// The headers.
    pub headers: HeaderMap,

    /// The raw body.
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parses the body as JSON.
    pub fn json(&self) -> Result<Value, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Gets a header's value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl TestApp {
    /// Starts a server with every gate enabled.
    pub async fn start() -> Result<Self, Error> {
        Self::start_with(&[]).await
    }

    /// Starts a server with every gate enabled, except as changed by `overrides`.
    pub async fn start_with(overrides: &[(&'static str, &str)]) -> Result<Self, Error> {
        let captcha = MockServer::start().await;
        let upstream = MockServer::start().await;

        let mut vars: HashMap<&str, String> = HashMap::from([
            ("ALLOWED_ORIGIN", ORIGIN.to_owned()),
            ("API_KEY", API_KEY.to_owned()),
            ("RECAPTCHA_SECRET_KEY", RECAPTCHA_SECRET.to_owned()),
            (
                "RECAPTCHA_VERIFY_URL",
                format!("{}{SITEVERIFY_PATH}", captcha.uri()),
            ),
            (
                "UPSTREAM_WEBHOOK_URL",
                format!("{}{WEBHOOK_PATH}", upstream.uri()),
            ),
        ]);

        for &(name, value) in overrides {
            vars.insert(name, value.to_owned());
        }

        let config = Config::from_lookup(|name| Ok(vars.get(name).cloned()))?;
        let router = api::router(AppState::new(config)?);

        Ok(Self {
            router,
            captcha,
            upstream,
        })
    }

    /// Sends a request to the server.
    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse, Error> {
        let response = self.router.clone().oneshot(request).await?;
        let (parts, body) = response.into_parts();

        Ok(TestResponse {
            status: parts.status,
            headers: parts.headers,
            body: to_bytes(body, usize::MAX).await?.to_vec(),
        })
    }

    /// Sends a request that passes the referrer and API-key gates.
    pub async fn post(&self, body: &str) -> Result<TestResponse, Error> {
        self.send(authorized_post(body)?).await
    }
}

/// Builds a `POST /generate-policy` request with a valid referrer and API key.
pub fn authorized_post(body: &str) -> Result<Request<Body>, Error> {
    Ok(Request::builder()
        .method("POST")
        .uri("/generate-policy")
        .header("content-type", "application/json")
        .header("referer", "https://www.finokapi.com/generate")
        .header("x-api-key", API_KEY)
        .body(Body::from(body.to_owned()))?)
}
