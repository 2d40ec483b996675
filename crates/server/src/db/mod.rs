//! Database operations for the user directory.
//!
//! # Database: `userdir`
//!
//! ## Tables
//!
//! - `users` - Directory records (unique `email`, newest-first listing on `created_at`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p user-directory-cli -- migrate
//! ```
//!
//! # Adapters
//!
//! Handlers only see the [`UserRepository`] port. [`PgUserRepository`] is the
//! production adapter; [`InMemoryUserRepository`] backs tests (enabled with the
//! `test-support` feature).

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use user_directory_core::{User, UserId};

use crate::models::{NewUser, UserChanges};

#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryUserRepository;
pub use users::PgUserRepository;

/// Message used when an insert or update collides with an existing email.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "A user with this email already exists";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Port for user record persistence.
///
/// Records are keyed by [`UserId`]; the email address is unique across all
/// records. Listing returns the newest records first.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List every record, newest first.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// Fetch a record by ID.
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Insert a record.
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError>;

    /// Apply a partial update and return the stored record.
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist and
    /// `RepositoryError::Conflict` if the new email is already taken.
    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, RepositoryError>;

    /// Delete a record and return it.
    ///
    /// Returns `RepositoryError::NotFound` if the record does not exist.
    async fn delete(&self, id: UserId) -> Result<User, RepositoryError>;

    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
