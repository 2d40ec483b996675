//! User API route handlers.
//!
//! Creation is a composite operation: the multipart form is read and
//! validated, the image is stored, and only then is the record inserted. If
//! the insert fails the stored image is removed again.

use axum::{
    Json,
    body::Bytes,
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
};
use tracing::instrument;

use user_directory_core::{DeletedResponse, UpdateUserRequest, User, UserId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::{NewUserFields, UserChanges, ValidationError};
use crate::state::AppState;

/// Multipart field carrying the profile image.
pub const IMAGE_FIELD: &str = "profileImage";

/// Raw values collected from the creation form.
#[derive(Debug, Default)]
struct CreateUserForm {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    linkedin_url: Option<String>,
    image: Option<UploadedImage>,
}

#[derive(Debug)]
struct UploadedImage {
    file_name: String,
    bytes: Bytes,
}

/// List all users, newest first.
///
/// GET /users
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    let users = state.users().list().await?;
    tracing::debug!(count = users.len(), "Listed users");
    Ok(Json(users))
}

/// Fetch a single user.
///
/// GET /users/{id}
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<User>> {
    let id = parse_id(&id)?;
    state
        .users()
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Create a user from a multipart form with a profile image.
///
/// POST /users
#[instrument(skip(state, multipart))]
pub async fn create(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let form = read_create_form(multipart).await?;

    let image = form.image.ok_or(ValidationError::MissingImage)?;
    let fields = NewUserFields::validate(
        form.name.as_deref(),
        form.email.as_deref(),
        form.phone.as_deref(),
        form.linkedin_url.as_deref(),
    )?;

    let reference = state.images().save(&image.file_name, &image.bytes).await?;

    match state.users().create(&fields.with_image(reference.clone())).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "User created");
            add_breadcrumb(
                "users",
                "Created user",
                Some(&[("user_id", &user.id.to_string())]),
            );
            Ok((StatusCode::CREATED, Json(user)))
        }
        Err(e) => {
            discard_image(&state, &reference).await;
            Err(e.into())
        }
    }
}

/// Partially update a user.
///
/// PUT /users/{id}
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let id = parse_id(&id)?;
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let changes = UserChanges::try_from(request)?;

    let user = state.users().update(id, &changes).await?;

    tracing::info!(user_id = %user.id, "User updated");
    add_breadcrumb(
        "users",
        "Updated user",
        Some(&[("user_id", &user.id.to_string())]),
    );
    Ok(Json(user))
}

/// Delete a user and its stored image.
///
/// DELETE /users/{id}
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>> {
    let id = parse_id(&id)?;
    let user = state.users().delete(id).await?;
    discard_image(&state, &user.profile_image).await;

    tracing::info!(user_id = %user.id, "User deleted");
    add_breadcrumb(
        "users",
        "Deleted user",
        Some(&[("user_id", &user.id.to_string())]),
    );
    Ok(Json(DeletedResponse {
        message: "User deleted successfully".to_string(),
    }))
}

fn parse_id(raw: &str) -> Result<UserId> {
    UserId::parse(raw).ok_or(AppError::Validation(ValidationError::InvalidId))
}

/// Read every field of the creation form. Unknown fields are skipped.
async fn read_create_form(mut multipart: Multipart) -> Result<CreateUserForm> {
    let mut form = CreateUserForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        match name.as_str() {
            IMAGE_FIELD => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                if !bytes.is_empty() {
                    form.image = Some(UploadedImage { file_name, bytes });
                }
            }
            "name" => form.name = Some(field.text().await.map_err(multipart_error)?),
            "email" => form.email = Some(field.text().await.map_err(multipart_error)?),
            "phone" => form.phone = Some(field.text().await.map_err(multipart_error)?),
            "linkedinUrl" => {
                form.linkedin_url = Some(field.text().await.map_err(multipart_error)?);
            }
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(format!("Invalid form data: {}", err.body_text()))
    }
}

/// Best-effort removal of an image whose record is gone or was never written.
async fn discard_image(state: &AppState, reference: &str) {
    if let Err(e) = state.images().remove(reference).await {
        tracing::warn!(error = %e, reference, "Failed to remove stored image");
    }
}
