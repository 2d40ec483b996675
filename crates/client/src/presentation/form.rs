//! Creation form.

use thiserror::Error;

use user_directory_core::User;

use crate::api::{ImageUpload, NewUserForm, UserApi};
use crate::error::ApiError;

pub const MISSING_IMAGE: &str = "Please select a profile image.";
pub const CREATED: &str = "User created successfully!";
pub const CREATE_FAILED: &str = "Failed to create user";

/// Why a submission did not create a user.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Please select a profile image.")]
    MissingImage,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Input collected for a new user.
///
/// A successful [`submit`](Self::submit) clears every field and the image;
/// a failed one keeps them so the user can correct and resubmit.
#[derive(Debug, Clone, Default)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: String,
    image: Option<ImageUpload>,
    error: Option<String>,
    success: Option<String>,
}

impl UserForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_image(&mut self, image: ImageUpload) {
        self.image = Some(image);
    }

    /// Name of the selected image, if any.
    #[must_use]
    pub fn image_name(&self) -> Option<&str> {
        self.image.as_ref().map(|image| image.file_name.as_str())
    }

    /// Message from the last failed submission.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Message from the last successful submission.
    #[must_use]
    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    /// Create the user through `api`.
    ///
    /// Pass the returned user to `SyncController::insert_created`.
    ///
    /// # Errors
    ///
    /// Returns `SubmitError::MissingImage` without calling the API when no
    /// image is selected, or the API error. Either way the message is kept
    /// in [`error`](Self::error).
    pub async fn submit(&mut self, api: &dyn UserApi) -> Result<User, SubmitError> {
        self.error = None;
        self.success = None;

        let Some(image) = self.image.clone() else {
            self.error = Some(MISSING_IMAGE.to_string());
            return Err(SubmitError::MissingImage);
        };

        let form = NewUserForm {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            linkedin_url: self.linkedin_url.clone(),
            image,
        };

        match api.create_user(&form).await {
            Ok(user) => {
                *self = Self {
                    success: Some(CREATED.to_string()),
                    ..Self::default()
                };
                Ok(user)
            }
            Err(e) => {
                self.error = Some(e.user_message(CREATE_FAILED));
                Err(e.into())
            }
        }
    }
}

/// Text block with the outcome of the last submission.
#[must_use]
pub fn render_form_status(form: &UserForm) -> String {
    match (form.error(), form.success()) {
        (Some(error), _) => format!("Error: {error}"),
        (None, Some(success)) => success.to_string(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use user_directory_core::ErrorBody;

    use super::*;
    use crate::api::MockUserApi;
    use crate::state::tests::user;

    fn filled() -> UserForm {
        let mut form = UserForm::new();
        form.name = "Ann".to_string();
        form.email = "a@x.com".to_string();
        form.phone = "555".to_string();
        form
    }

    fn png() -> ImageUpload {
        ImageUpload {
            file_name: "ann.png".to_string(),
            bytes: b"png".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_submit_requires_image() {
        let mut api = MockUserApi::new();
        api.expect_create_user().never();
        let mut form = filled();

        let err = form.submit(&api).await.unwrap_err();
        assert!(matches!(err, SubmitError::MissingImage));
        assert_eq!(form.error(), Some("Please select a profile image."));
        assert_eq!(form.name, "Ann");
    }

    #[tokio::test]
    async fn test_submit_success_resets_form() {
        let mut api = MockUserApi::new();
        api.expect_create_user()
            .withf(|form| {
                form.name == "Ann" && form.linkedin_url.is_empty() && form.image.file_name == "ann.png"
            })
            .times(1)
            .returning(|_| Ok(user(1, "Ann")));
        let mut form = filled();
        form.select_image(png());

        let created = form.submit(&api).await.unwrap();
        assert_eq!(created.name, "Ann");
        assert_eq!(form.success(), Some("User created successfully!"));
        assert!(form.error().is_none());
        assert!(form.name.is_empty() && form.email.is_empty());
        assert!(form.image_name().is_none());
        assert_eq!(render_form_status(&form), "User created successfully!");
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_input() {
        let mut api = MockUserApi::new();
        api.expect_create_user().returning(|_| {
            Err(ApiError::Conflict(Some(ErrorBody::new(
                "A user with this email already exists",
            ))))
        });
        let mut form = filled();
        form.select_image(png());

        assert!(form.submit(&api).await.is_err());
        assert_eq!(form.error(), Some("A user with this email already exists"));
        assert_eq!(form.image_name(), Some("ann.png"));
        assert_eq!(
            render_form_status(&form),
            "Error: A user with this email already exists"
        );
    }

    #[tokio::test]
    async fn test_submit_failure_without_body() {
        let mut api = MockUserApi::new();
        api.expect_create_user().returning(|_| {
            Err(ApiError::Server {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: None,
            })
        });
        let mut form = filled();
        form.select_image(png());

        form.submit(&api).await.unwrap_err();
        assert_eq!(form.error(), Some("Failed to create user"));
    }
}
