//! Process-wide configuration, read once from the environment at start-up.
//!
//! Values come from environment variables, with a `.env` file in the working directory loaded by
//! [`dotenvy`] first. Real environment variables take priority over the `.env` file.

use std::{env::VarError, fmt, time::Duration};

use axum::http::HeaderValue;
use reqwest::Url;
use thiserror::Error;

/// The address to listen on if `ADDRESS` isn't set.
const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";

/// The CORS origin if `ALLOWED_ORIGIN` isn't set.
const DEFAULT_ALLOWED_ORIGIN: &str = "https://www.finokapi.com";

/// The required referrer substring if `REFERRER_DOMAIN` isn't set.
const DEFAULT_REFERRER_DOMAIN: &str = "finokapi.com";

/// The reCAPTCHA verification endpoint if `RECAPTCHA_VERIFY_URL` isn't set.
const DEFAULT_RECAPTCHA_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// The upstream webhook if `UPSTREAM_WEBHOOK_URL` isn't set.
const DEFAULT_UPSTREAM_WEBHOOK_URL: &str =
    "https://finokapi.app.n8n.cloud/webhook/e070409b-7313-4c3c-b670-346c0b9f53ce";

/// The immutable configuration shared by every request.
#[derive(Clone)]
pub struct Config {
    /// The socket address the server listens on.
    pub address: String,

    /// The value of `Access-Control-Allow-Origin` on every response. May be `*`.
    pub allowed_origin: HeaderValue,

    /// The substring the `Referer` header must contain, or `None` if the referrer isn't checked.
    pub referrer_domain: Option<String>,

    /// The secret the `X-API-Key` header must equal, or `None` if API keys aren't checked.
    pub api_key: Option<String>,

    /// How to verify CAPTCHA tokens, or `None` if they aren't verified.
    pub captcha: Option<CaptchaConfig>,

    /// The webhook accepted requests are forwarded to.
    pub upstream_url: Url,

    /// The timeout for each outbound request, if any.
    pub upstream_timeout: Option<Duration>,
}

/// Settings for the reCAPTCHA verification gate.
#[derive(Clone)]
pub struct CaptchaConfig {
    /// The server-side reCAPTCHA secret.
    pub secret_key: String,

    /// The verification endpoint tokens are posted to.
    pub verify_url: Url,
}

/// An error loading the [`Config`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The environment (or `.env` file) couldn't be read.
    #[error("failed to read environment variable `{name}`: {source}")]
    Read {
        /// The variable being read.
        name: &'static str,

        /// The underlying error.
        source: dotenvy::Error,
    },

    /// A secret is unset even though the gate using it is enabled.
    #[error("environment variable `{name}` should be set while `{toggle}` is enabled")]
    Missing {
        /// The unset variable.
        name: &'static str,

        /// The variable enabling the gate that needs it.
        toggle: &'static str,
    },

    /// A variable is set to something that can't be parsed.
    #[error("environment variable `{name}` has invalid value {value:?}, expected {expected}")]
    Invalid {
        /// The invalid variable.
        name: &'static str,

        /// The value it was set to.
        value: String,

        /// A description of what would've been valid.
        expected: &'static str,
    },
}

impl Config {
    /// Loads the configuration from the environment, including any `.env` file.
    ///
    /// # Errors
    ///
    /// See [`ConfigError`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| match dotenvy::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(None),
            Err(source) => Err(ConfigError::Read { name, source }),
        })
    }

    /// Builds the configuration from an arbitrary variable lookup. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// See [`ConfigError`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Result<Option<String>, ConfigError>,
    {
        let var = |name: &'static str| -> Result<Option<String>, ConfigError> {
            Ok(lookup(name)?.filter(|value| !value.is_empty()))
        };

        let address = var("ADDRESS")?.unwrap_or_else(|| DEFAULT_ADDRESS.into());

        let allowed_origin = match var("ALLOWED_ORIGIN")? {
            Some(value) => HeaderValue::from_str(&value).map_err(|_| ConfigError::Invalid {
                name: "ALLOWED_ORIGIN",
                value,
                expected: "a valid header value",
            })?,
            None => HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN),
        };

        let referrer_domain = if flag(var("REQUIRE_REFERRER")?, "REQUIRE_REFERRER")? {
            Some(var("REFERRER_DOMAIN")?.unwrap_or_else(|| DEFAULT_REFERRER_DOMAIN.into()))
        } else {
            None
        };

        let api_key = if flag(var("REQUIRE_API_KEY")?, "REQUIRE_API_KEY")? {
            Some(var("API_KEY")?.ok_or(ConfigError::Missing {
                name: "API_KEY",
                toggle: "REQUIRE_API_KEY",
            })?)
        } else {
            None
        };

        let captcha = if flag(var("VERIFY_CAPTCHA")?, "VERIFY_CAPTCHA")? {
            Some(CaptchaConfig {
                secret_key: var("RECAPTCHA_SECRET_KEY")?.ok_or(ConfigError::Missing {
                    name: "RECAPTCHA_SECRET_KEY",
                    toggle: "VERIFY_CAPTCHA",
                })?,
                verify_url: url(
                    var("RECAPTCHA_VERIFY_URL")?,
                    "RECAPTCHA_VERIFY_URL",
                    DEFAULT_RECAPTCHA_VERIFY_URL,
                )?,
            })
        } else {
            None
        };

        let upstream_url = url(
            var("UPSTREAM_WEBHOOK_URL")?,
            "UPSTREAM_WEBHOOK_URL",
            DEFAULT_UPSTREAM_WEBHOOK_URL,
        )?;

        let upstream_timeout = match var("UPSTREAM_TIMEOUT_SECS")? {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "UPSTREAM_TIMEOUT_SECS",
                        value,
                        expected: "a positive number of seconds",
                    })
                }
            },
            None => None,
        };

        Ok(Self {
            address,
            allowed_origin,
            referrer_domain,
            api_key,
            captcha,
            upstream_url,
            upstream_timeout,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secrets are replaced so the config can be logged.
        f.debug_struct("Config")
            .field("address", &self.address)
            .field("allowed_origin", &self.allowed_origin)
            .field("referrer_domain", &self.referrer_domain)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("captcha", &self.captcha)
            .field("upstream_url", &self.upstream_url.origin().ascii_serialization())
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

impl fmt::Debug for CaptchaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptchaConfig")
            .field("secret_key", &"<redacted>")
            .field("verify_url", &self.verify_url.as_str())
            .finish()
    }
}

/// Parses a boolean toggle, defaulting to enabled.
fn flag(value: Option<String>, name: &'static str) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(true);
    };

    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            expected: "a boolean",
        }),
    }
}

/// Parses an HTTP(S) URL, falling back to `default` if unset.
fn url(value: Option<String>, name: &'static str, default: &str) -> Result<Url, ConfigError> {
    let value = value.unwrap_or_else(|| default.into());

    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            expected: "an HTTP or HTTPS URL",
        }),
    }
}
