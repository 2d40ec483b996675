//! Presentation components.
//!
//! View models for the creation form, a single user card and the user list,
//! each with a plain-text renderer used by the terminal front-end.

pub mod card;
pub mod form;
pub mod list;

pub use card::{DEFAULT_AVATAR, EditDraft, UNKNOWN_NAME, UserCard, render_card};
pub use form::{SubmitError, UserForm, render_form_status};
pub use list::{NO_MATCHES, NO_USERS, UserListView, render_list};
