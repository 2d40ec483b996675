//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::UserRepository;
use crate::services::ImageStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The repository and image store
/// are injected at start-up, so handlers never reach for global connections.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    users: Arc<dyn UserRepository>,
    images: Arc<dyn ImageStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `users` - User repository adapter
    /// * `images` - Profile image store adapter
    #[must_use]
    pub fn new(
        config: ServerConfig,
        users: Arc<dyn UserRepository>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                images,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get the user repository.
    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.inner.users.as_ref()
    }

    /// Get the profile image store.
    #[must_use]
    pub fn images(&self) -> &dyn ImageStore {
        self.inner.images.as_ref()
    }
}
