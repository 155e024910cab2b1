//! Utilities to help with API request validation.

use derive_more::derive::{AsRef, Deref, Display};
use serde::Deserialize;
use thiserror::Error;

/// A reCAPTCHA response token, guaranteed to be non-empty and at most [`CaptchaToken::MAX_LEN`]
/// bytes long.
#[derive(Deref, AsRef, Display, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
#[as_ref(forward)]
#[serde(try_from = "String")]
pub struct CaptchaToken(String);

impl CaptchaToken {
    /// The longest token accepted. Real tokens are well under this.
    pub const MAX_LEN: usize = 2048;

    /// Consumes the [`CaptchaToken`], returning the wrapped [`String`].
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// An error constructing a [`CaptchaToken`].
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
pub enum CaptchaTokenError {
    /// The token was empty.
    #[error("token is empty")]
    Empty,

    /// The token was longer than [`CaptchaToken::MAX_LEN`].
    #[error("token length {0} exceeds the maximum")]
    TooLong(usize),
}

impl TryFrom<String> for CaptchaToken {
    type Error = CaptchaTokenError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        if token.is_empty() {
            Err(CaptchaTokenError::Empty)
        } else if token.len() > Self::MAX_LEN {
            Err(CaptchaTokenError::TooLong(token.len()))
        } else {
            Ok(Self(token))
        }
    }
}
