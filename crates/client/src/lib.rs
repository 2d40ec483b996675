//! User Directory Client.
//!
//! Keeps a local, searchable mirror of the user directory in sync with the
//! HTTP API without reloading the whole list after every mutation.
//!
//! # Modules
//!
//! - [`api`] - `UserApi` port and its reqwest adapter
//! - [`controller`] - `SyncController`, the owner of the local mirror
//! - [`state`] - Observable controller state and the name filter
//! - [`presentation`] - Form, card and list view models plus text rendering
//! - [`error`] - Classified API errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod controller;
pub mod error;
pub mod presentation;
pub mod state;

pub use api::{HttpUserApi, ImageUpload, NewUserForm, UserApi};
pub use controller::SyncController;
pub use error::ApiError;
pub use state::{ActionError, ControllerState, LoadState};
