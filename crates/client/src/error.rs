//! Errors returned by the user API client.

use reqwest::StatusCode;
use thiserror::Error;

use user_directory_core::ErrorBody;

/// A failed API call, classified by HTTP status.
///
/// Every non-transport variant carries the server's [`ErrorBody`] when the
/// response body parsed as one.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request was rejected as invalid (400 or 422).
    #[error("validation error: {}", describe(.0))]
    Validation(Option<ErrorBody>),

    /// The record does not exist (404).
    #[error("not found: {}", describe(.0))]
    NotFound(Option<ErrorBody>),

    /// The email address is already taken (409).
    #[error("conflict: {}", describe(.0))]
    Conflict(Option<ErrorBody>),

    /// Any other non-success status.
    #[error("server error ({status}): {}", describe(.body))]
    Server {
        status: StatusCode,
        body: Option<ErrorBody>,
    },

    /// The server could not be reached or the response could not be read.
    #[error("transport error: {0}")]
    Transport(String),
}

fn describe(body: &Option<ErrorBody>) -> String {
    body.as_ref()
        .map_or_else(|| "no details".to_string(), ErrorBody::message)
}

impl ApiError {
    /// Classify a non-success response.
    #[must_use]
    pub fn from_status(status: StatusCode, body: Option<ErrorBody>) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Validation(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::CONFLICT => Self::Conflict(body),
            status => Self::Server { status, body },
        }
    }

    /// The server-provided error body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Validation(body) | Self::NotFound(body) | Self::Conflict(body) => body.as_ref(),
            Self::Server { body, .. } => body.as_ref(),
            Self::Transport(_) => None,
        }
    }

    /// Returns `true` for a 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Message to show the user.
    ///
    /// The server's error (with details) when it sent one; otherwise
    /// `fallback`, followed by the reason for transport failures.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match (self.body(), self) {
            (Some(body), _) if !body.error.trim().is_empty() => body.message(),
            (_, Self::Transport(reason)) => format!("{fallback}: {reason}"),
            _ => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
