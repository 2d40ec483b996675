//! Directory email addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string is not a usable directory email.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email must look like name@domain")]
    Malformed,
}

/// A user's email address, the directory's uniqueness key.
///
/// Input is trimmed, then must be a single `name@domain` token without
/// whitespace. Case is kept as entered, so uniqueness is case-sensitive.
/// Deserialization runs the same checks, which lets the client reject a
/// record the server should never have produced.
///
/// ```
/// use user_directory_core::Email;
///
/// assert_eq!(Email::parse(" ann@example.com ").unwrap().as_str(), "ann@example.com");
/// assert!(Email::parse("ann@").is_err());
/// assert!(Email::parse("ann lee@example.com").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Longest address accepted (RFC 5321 path limit).
    pub const MAX_LENGTH: usize = 254;

    /// Validate and trim `input`.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` for blank, overlong or malformed input.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let email = input.trim();
        if email.is_empty() {
            return Err(EmailError::Empty);
        }
        if email.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let well_formed = !email.chars().any(char::is_whitespace)
            && email
                .split_once('@')
                .is_some_and(|(name, domain)| {
                    !name.is_empty() && !domain.is_empty() && !domain.contains('@')
                });
        if !well_formed {
            return Err(EmailError::Malformed);
        }

        Ok(Self(email.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}
