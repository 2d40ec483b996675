//! Per-record card and its edit draft.

use user_directory_core::{Email, EmailError, User, UserId, normalize_optional};

/// Shown when a record has no usable name.
pub const UNKNOWN_NAME: &str = "Unknown User";

/// Avatar used when a record has no image reference.
pub const DEFAULT_AVATAR: &str = "/default-avatar.png";

/// Display model for one user.
#[derive(Debug, Clone, Copy)]
pub struct UserCard<'a> {
    user: &'a User,
}

impl<'a> UserCard<'a> {
    #[must_use]
    pub const fn new(user: &'a User) -> Self {
        Self { user }
    }

    #[must_use]
    pub const fn id(&self) -> UserId {
        self.user.id
    }

    #[must_use]
    pub fn display_name(&self) -> &'a str {
        let name = self.user.name.trim();
        if name.is_empty() { UNKNOWN_NAME } else { name }
    }

    #[must_use]
    pub fn avatar(&self) -> &'a str {
        let image = self.user.profile_image.trim();
        if image.is_empty() { DEFAULT_AVATAR } else { image }
    }

    /// Alternative text for the avatar.
    #[must_use]
    pub fn avatar_alt(&self) -> String {
        if self.user.name.trim().is_empty() {
            "User profile picture".to_string()
        } else {
            format!("{}'s profile picture", self.user.name.trim())
        }
    }

    #[must_use]
    pub fn email(&self) -> Option<&'a str> {
        Some(self.user.email.as_str()).filter(|email| !email.is_empty())
    }

    #[must_use]
    pub fn phone(&self) -> Option<&'a str> {
        self.user.phone.as_deref().filter(|p| !p.trim().is_empty())
    }

    #[must_use]
    pub fn linkedin_url(&self) -> Option<&'a str> {
        self.user
            .linkedin_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    /// Start editing this record.
    #[must_use]
    pub fn edit(&self) -> EditDraft {
        EditDraft::new(self.user.clone())
    }
}

/// Editable copy of a record's updatable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    original: User,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: String,
}

impl EditDraft {
    fn new(original: User) -> Self {
        Self {
            name: original.name.clone(),
            email: original.email.as_str().to_owned(),
            phone: original.phone.clone().unwrap_or_default(),
            linkedin_url: original.linkedin_url.clone().unwrap_or_default(),
            original,
        }
    }

    #[must_use]
    pub const fn id(&self) -> UserId {
        self.original.id
    }

    /// Apply the edits, producing the record to pass to
    /// `SyncController::update`.
    ///
    /// Blank optional fields become `None`. The name is sent as typed so the
    /// server reports a blank one.
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the edited email is malformed.
    pub fn finish(self) -> Result<User, EmailError> {
        let email = Email::parse(&self.email)?;
        Ok(User {
            name: self.name.trim().to_owned(),
            email,
            phone: normalize_optional(&self.phone),
            linkedin_url: normalize_optional(&self.linkedin_url),
            ..self.original
        })
    }
}

/// Text block for one card.
#[must_use]
pub fn render_card(card: &UserCard<'_>) -> String {
    let mut lines = vec![
        format!("#{} {}", card.id(), card.display_name()),
        format!("  image:    {}", card.avatar()),
    ];
    if let Some(email) = card.email() {
        lines.push(format!("  email:    {email}"));
    }
    if let Some(phone) = card.phone() {
        lines.push(format!("  phone:    {phone}"));
    }
    if let Some(url) = card.linkedin_url() {
        lines.push(format!("  linkedin: {url}"));
    }
    lines.join("\n")
}
