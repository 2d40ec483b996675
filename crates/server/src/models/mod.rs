//! Domain models for the server.
//!
//! Wire types live in `user_directory_core`; this module holds the validated
//! inputs the repository accepts.

pub mod user;

pub use user::{NewUser, NewUserFields, UserChanges, ValidationError};
