//! User domain inputs.
//!
//! These types represent validated inputs separate from the raw form and JSON
//! bodies the API receives.

use thiserror::Error;
use url::Url;

use user_directory_core::{Email, EmailError, UpdateUserRequest, User, normalize_optional};

/// Reasons a create or update request is rejected before reaching storage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,
    #[error("Email is required")]
    MissingEmail,
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("LinkedIn URL must be a valid http(s) URL")]
    InvalidLinkedinUrl,
    #[error("Profile image is required")]
    MissingImage,
    #[error("Invalid user ID format")]
    InvalidId,
}

impl From<EmailError> for ValidationError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Empty => Self::MissingEmail,
            other => Self::InvalidEmail(other.to_string()),
        }
    }
}

/// Validated text fields of a creation form, before the image is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserFields {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
}

impl NewUserFields {
    /// Validate raw form values.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if the name or email is missing or blank,
    /// the email is malformed, or the LinkedIn URL is not an http(s) URL.
    pub fn validate(
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        linkedin_url: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let name = required_name(name.unwrap_or_default())?;
        let email = Email::parse(email.unwrap_or_default())?;
        let phone = phone.and_then(normalize_optional);
        let linkedin_url = linkedin_url.map(optional_linkedin_url).transpose()?.flatten();

        Ok(Self {
            name,
            email,
            phone,
            linkedin_url,
        })
    }

    /// Attach the stored image reference, producing a record ready to insert.
    #[must_use]
    pub fn with_image(self, profile_image: String) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            phone: self.phone,
            linkedin_url: self.linkedin_url,
            profile_image,
        }
    }
}

/// A user record ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub profile_image: String,
}

/// A validated partial update.
///
/// `None` leaves a field untouched. For the optional fields, `Some(None)`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<Option<String>>,
    pub linkedin_url: Option<Option<String>>,
}

impl UserChanges {
    /// Apply the changes to a record in place.
    pub fn apply(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            user.phone.clone_from(phone);
        }
        if let Some(linkedin_url) = &self.linkedin_url {
            user.linkedin_url.clone_from(linkedin_url);
        }
    }
}

impl TryFrom<UpdateUserRequest> for UserChanges {
    type Error = ValidationError;

    fn try_from(request: UpdateUserRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: request.name.as_deref().map(required_name).transpose()?,
            email: request.email.as_deref().map(Email::parse).transpose()?,
            phone: request.phone.as_deref().map(normalize_optional),
            linkedin_url: request
                .linkedin_url
                .as_deref()
                .map(optional_linkedin_url)
                .transpose()?,
        })
    }
}

fn required_name(raw: &str) -> Result<String, ValidationError> {
    normalize_optional(raw).ok_or(ValidationError::MissingName)
}

/// Blank input clears the URL; anything else must parse as http(s).
fn optional_linkedin_url(raw: &str) -> Result<Option<String>, ValidationError> {
    let Some(value) = normalize_optional(raw) else {
        return Ok(None);
    };
    match Url::parse(&value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Some(value)),
        _ => Err(ValidationError::InvalidLinkedinUrl),
    }
}
