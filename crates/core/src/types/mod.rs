//! Core types for the user directory.
//!
//! This module provides type-safe wrappers for common domain concepts and the
//! JSON bodies exchanged between the server and its clients.

pub mod email;
pub mod id;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use user::*;
