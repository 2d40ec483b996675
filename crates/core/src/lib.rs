//! User Directory Core - Shared types library.
//!
//! This crate provides common types used across all user directory components:
//! - `server` - HTTP API over the user repository and image store
//! - `client` - Sync controller and presentation components
//! - `cli` - Command-line front-end and migrations
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, user records and API wire bodies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
