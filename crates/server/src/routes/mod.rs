//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health           - Liveness check
//! GET    /health/ready     - Readiness check (repository reachable)
//!
//! # Users
//! GET    /users            - List users, newest first
//! POST   /users            - Create user (multipart, with profile image)
//! GET    /users/{id}       - Fetch one user
//! PUT    /users/{id}       - Partially update user (JSON)
//! DELETE /users/{id}       - Delete user and its stored image
//!
//! # Static
//! GET    /uploads/{file}   - Stored profile images (prefix is configurable)
//! ```

pub mod health;
pub mod users;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Create the user API routes.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::index).post(users::create))
        .route(
            "/users/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new().merge(health_routes()).merge(user_routes())
}
