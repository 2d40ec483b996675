//! User API port and its HTTP adapter.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use user_directory_core::{DeletedResponse, ErrorBody, UpdateUserRequest, User, UserId};

use crate::error::ApiError;

/// Multipart field carrying the profile image.
const IMAGE_FIELD: &str = "profileImage";

/// A profile image selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name; only its extension is kept by the server.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Read an image from disk.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub async fn from_file(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }
}

/// Fields of `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: String,
    pub image: ImageUpload,
}

/// Port for the remote user API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserApi: Send + Sync {
    /// Fetch every user, newest first.
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;

    /// Create a user with its profile image.
    async fn create_user(&self, form: &NewUserForm) -> Result<User, ApiError>;

    /// Send a partial update and return the stored record.
    async fn update_user(
        &self,
        id: UserId,
        request: &UpdateUserRequest,
    ) -> Result<User, ApiError>;

    /// Delete a user.
    async fn delete_user(&self, id: UserId) -> Result<DeletedResponse, ApiError>;
}

/// `UserApi` over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpUserApi {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpUserApi {
    /// Create a client for the API rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing reqwest client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, mut base_url: Url) -> Self {
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid URL {path}: {e}")))
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let response = self.client.get(self.endpoint("users")?).send().await?;
        read_response(response).await
    }

    #[instrument(skip(self, form), fields(email = %form.email))]
    async fn create_user(&self, form: &NewUserForm) -> Result<User, ApiError> {
        let image = Part::bytes(form.image.bytes.clone()).file_name(form.image.file_name.clone());
        let multipart = Form::new()
            .text("name", form.name.clone())
            .text("email", form.email.clone())
            .text("phone", form.phone.clone())
            .text("linkedinUrl", form.linkedin_url.clone())
            .part(IMAGE_FIELD, image);

        let response = self
            .client
            .post(self.endpoint("users")?)
            .multipart(multipart)
            .send()
            .await?;
        read_response(response).await
    }

    #[instrument(skip(self, request))]
    async fn update_user(
        &self,
        id: UserId,
        request: &UpdateUserRequest,
    ) -> Result<User, ApiError> {
        let response = self
            .client
            .put(self.endpoint(&format!("users/{id}"))?)
            .json(request)
            .send()
            .await?;
        read_response(response).await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, id: UserId) -> Result<DeletedResponse, ApiError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("users/{id}"))?)
            .send()
            .await?;
        read_response(response).await
    }
}

/// Decode a success body, or classify the failure.
async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    // An unreadable error body still yields a classified error
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&text).ok();

    tracing::warn!(
        status = %status,
        error = ?body.as_ref().map(|b| b.error.as_str()),
        "User API request failed"
    );

    Err(ApiError::from_status(status, body))
}
