//! User records and the JSON bodies of the user API.
//!
//! These types are shared verbatim by the server (which produces them) and the
//! client (which mirrors them locally), so the wire shape is defined once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// A user record as returned by the API.
///
/// Serialized in camelCase:
///
/// ```json
/// { "id": 1, "name": "Ann", "email": "a@x.com", "phone": null,
///   "linkedinUrl": null, "profileImage": "/uploads/….png",
///   "createdAt": "2026-01-01T00:00:00Z" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned, immutable identifier.
    pub id: UserId,
    /// Display name, never blank.
    pub name: String,
    /// Unique email address.
    pub email: Email,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional LinkedIn profile URL.
    pub linkedin_url: Option<String>,
    /// Reference path of the stored profile image (e.g. `/uploads/<file>`).
    pub profile_image: String,
    /// Creation time; the list endpoint sorts on it, newest first.
    pub created_at: DateTime<Utc>,
}

/// JSON body of `PUT /users/{id}`.
///
/// Every field is optional: absent fields are left untouched. An empty
/// `phone` or `linkedinUrl` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
}

impl UpdateUserRequest {
    /// Build a full-replacement request from the current fields of a record.
    ///
    /// Missing optional fields are sent as empty strings so the server keeps
    /// them cleared.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            name: Some(user.name.clone()),
            email: Some(user.email.as_str().to_owned()),
            phone: Some(user.phone.clone().unwrap_or_default()),
            linkedin_url: Some(user.linkedin_url.clone().unwrap_or_default()),
        }
    }
}

/// Failure body returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// Optional extra detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    /// Create an error body without details.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    /// Attach a detail string.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// The message shown to users: `error`, followed by `details` if present.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.details {
            Some(details) if !details.is_empty() => format!("{}: {details}", self.error),
            _ => self.error.clone(),
        }
    }
}

/// Success body of `DELETE /users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
}

/// Trim an optional text field, mapping blank input to `None`.
#[must_use]
pub fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
