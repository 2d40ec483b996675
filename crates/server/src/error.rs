//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; every failure is rendered as a JSON `ErrorBody`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use user_directory_core::ErrorBody;

use crate::db::RepositoryError;
use crate::models::ValidationError;
use crate::services::ImageStoreError;

/// Message returned for every 5xx response; details stay in the logs.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Request fields failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Malformed request body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body exceeded the configured limit.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Unique constraint violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Image storage failed.
    #[error("Image store error: {0}")]
    ImageStore(#[from] ImageStoreError),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("User not found".to_string()),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Database(other),
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ImageStore(ImageStoreError::EmptyUpload) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::ImageStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body returned to the client.
    ///
    /// Internal error details are never exposed.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        match self {
            Self::Validation(err) => ErrorBody::new(err.to_string()),
            Self::ImageStore(ImageStoreError::EmptyUpload) => {
                ErrorBody::new(ValidationError::MissingImage.to_string())
            }
            Self::BadRequest(message) | Self::Conflict(message) | Self::NotFound(message) => {
                ErrorBody::new(message.clone())
            }
            Self::PayloadTooLarge => ErrorBody::new("Uploaded file is too large"),
            Self::Database(_) | Self::ImageStore(_) => ErrorBody::new(INTERNAL_ERROR_MESSAGE),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("users", "Deleted user", Some(&[("user_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("User not found".to_string());
        assert_eq!(err.to_string(), "Not found: User not found");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::Validation(ValidationError::MissingName)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::ImageStore(ImageStoreError::EmptyUpload)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("taken".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::PayloadTooLarge),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            get_status(AppError::ImageStore(ImageStoreError::InvalidReference(
                "/etc/passwd".to_string()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_errors_map_to_kinds() {
        assert!(matches!(
            AppError::from(RepositoryError::NotFound),
            AppError::NotFound(ref m) if m == "User not found"
        ));
        assert!(matches!(
            AppError::from(RepositoryError::Conflict("dup".to_string())),
            AppError::Conflict(ref m) if m == "dup"
        ));
        assert!(matches!(
            AppError::from(RepositoryError::DataCorruption("bad".to_string())),
            AppError::Database(_)
        ));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "invalid email in database".to_string(),
        ));
        assert_eq!(err.body(), ErrorBody::new("Internal server error"));

        let err = AppError::Validation(ValidationError::MissingEmail);
        assert_eq!(err.body(), ErrorBody::new("Email is required"));
    }
}
