//! User management commands.
//!
//! Each command talks to the running server through `HttpUserApi`, drives a
//! `SyncController` and prints the presentation components as text.
//!
//! # Environment Variables
//!
//! - `USERDIR_API_URL` - Base URL of the API (default: <http://127.0.0.1:3000>)

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use url::Url;

use user_directory_client::presentation::{
    EditDraft, UserCard, UserForm, render_card, render_form_status, render_list,
};
use user_directory_client::{ControllerState, HttpUserApi, ImageUpload, SyncController};
use user_directory_core::UserId;

/// Fields of the `create` command.
pub struct NewUserFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub linkedin_url: String,
    pub image: Option<PathBuf>,
}

/// Fields of the `update` command. Omitted fields keep their value; an
/// empty phone or LinkedIn URL clears it.
#[derive(Debug, Default, Args)]
pub struct FieldChanges {
    /// New display name
    #[arg(short, long)]
    name: Option<String>,

    /// New email address
    #[arg(short, long)]
    email: Option<String>,

    /// New phone number ("" clears it)
    #[arg(short, long)]
    phone: Option<String>,

    /// New LinkedIn profile URL ("" clears it)
    #[arg(short, long)]
    linkedin: Option<String>,
}

impl FieldChanges {
    fn apply(self, draft: &mut EditDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(email) = self.email {
            draft.email = email;
        }
        if let Some(phone) = self.phone {
            draft.phone = phone;
        }
        if let Some(linkedin) = self.linkedin {
            draft.linkedin_url = linkedin;
        }
    }
}

/// Print the list, optionally filtered by name.
///
/// # Errors
///
/// Returns an error if the list cannot be loaded (after printing the
/// failure view).
pub async fn list(api_url: Url, search: Option<String>) -> Result<(), Box<dyn Error>> {
    let controller = SyncController::new(Arc::new(HttpUserApi::new(api_url)));

    let loaded = controller.load().await;
    if let Some(term) = search {
        controller.set_search_term(term);
    }
    show(&render_list(&controller.snapshot()));

    loaded?;
    Ok(())
}

/// Create a user and print the updated list.
///
/// # Errors
///
/// Returns an error if the image cannot be read, the list cannot be loaded,
/// or the API rejects the user.
pub async fn create(api_url: Url, fields: NewUserFields) -> Result<(), Box<dyn Error>> {
    let api = Arc::new(HttpUserApi::new(api_url));
    let controller = SyncController::new(api.clone());
    controller.load().await?;

    let mut form = UserForm::new();
    form.name = fields.name;
    form.email = fields.email;
    form.phone = fields.phone;
    form.linkedin_url = fields.linkedin_url;
    if let Some(path) = &fields.image {
        let image = ImageUpload::from_file(path)
            .await
            .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
        form.select_image(image);
    }

    let submitted = form.submit(api.as_ref()).await;
    show(&render_form_status(&form));

    let user = submitted?;
    tracing::info!(user_id = %user.id, "Created user");
    controller.insert_created(user);
    show(&render_list(&controller.snapshot()));
    Ok(())
}

/// Update a user and print the stored record.
///
/// # Errors
///
/// Returns an error for an invalid or unknown ID, a malformed email, or a
/// failed update.
pub async fn update(api_url: Url, raw_id: &str, changes: FieldChanges) -> Result<(), Box<dyn Error>> {
    let id = parse_id(raw_id)?;
    let controller = SyncController::new(Arc::new(HttpUserApi::new(api_url)));
    controller.load().await?;

    let snapshot = controller.snapshot();
    let user = snapshot
        .all_users()
        .iter()
        .find(|user| user.id == id)
        .ok_or_else(|| format!("User {id} not found"))?;

    let mut draft = UserCard::new(user).edit();
    changes.apply(&mut draft);
    let edited = draft.finish()?;

    match controller.update(&edited).await {
        Ok(updated) => {
            show(&render_card(&UserCard::new(&updated)));
            Ok(())
        }
        Err(e) => {
            show_action_error(&controller.snapshot());
            Err(e.into())
        }
    }
}

/// Delete a user and print the remaining list.
///
/// # Errors
///
/// Returns an error for an invalid ID or a failed delete.
pub async fn delete(api_url: Url, raw_id: &str) -> Result<(), Box<dyn Error>> {
    let id = parse_id(raw_id)?;
    let controller = SyncController::new(Arc::new(HttpUserApi::new(api_url)));
    controller.load().await?;

    match controller.delete(id).await {
        Ok(()) => {
            show("User deleted successfully");
            show(&render_list(&controller.snapshot()));
            Ok(())
        }
        Err(e) => {
            show_action_error(&controller.snapshot());
            Err(e.into())
        }
    }
}

fn parse_id(raw: &str) -> Result<UserId, String> {
    UserId::parse(raw).ok_or_else(|| format!("Invalid user ID format: {raw}"))
}

fn show_action_error(state: &ControllerState) {
    if let Some(error) = state.action_error() {
        show(&format!("Error: {}", error.message()));
    }
}

#[allow(clippy::print_stdout)]
fn show(text: &str) {
    if !text.is_empty() {
        println!("{text}");
    }
}
