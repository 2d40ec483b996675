//! Integration tests for the user directory.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory tests (no external services)
//! cargo test -p user-directory-integration-tests
//!
//! # Postgres repository tests
//! USERDIR_TEST_DATABASE_URL=postgres://... \
//!     cargo test -p user-directory-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] serves the real router on an ephemeral port, backed by the
//! in-memory repository and a temporary upload directory.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use user_directory_client::{HttpUserApi, ImageUpload, NewUserForm};
use user_directory_server::config::ServerConfig;
use user_directory_server::db::InMemoryUserRepository;
use user_directory_server::services::LocalImageStore;
use user_directory_server::state::AppState;

/// A running server for one test.
pub struct TestApp {
    pub base_url: Url,
    pub users: Arc<InMemoryUserRepository>,
    upload_dir: TempDir,
    server: JoinHandle<()>,
}

impl TestApp {
    /// Start a server with an empty directory.
    ///
    /// # Panics
    ///
    /// Panics if the temp dir or the listener cannot be created.
    pub async fn spawn() -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
        let config = test_config(upload_dir.path());
        let images = Arc::new(LocalImageStore::new(
            upload_dir.path(),
            &config.upload_url_prefix,
        ));
        let app = user_directory_server::app(AppState::new(config, users.clone(), images));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}")).expect("Invalid test URL"),
            users,
            upload_dir,
            server,
        }
    }

    /// Client for this server.
    #[must_use]
    pub fn api(&self) -> HttpUserApi {
        HttpUserApi::new(self.base_url.clone())
    }

    /// Absolute URL of `path` on this server.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid relative URL.
    #[must_use]
    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).expect("Invalid path")
    }

    /// Number of files in the upload directory.
    #[must_use]
    pub fn stored_images(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).map_or(0, Iterator::count)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn test_config(upload_dir: &Path) -> ServerConfig {
    let upload_dir = upload_dir.display().to_string();
    ServerConfig::from_lookup(move |key| match key {
        "USERDIR_DATABASE_URL" => Some("postgres://unused".to_string()),
        "USERDIR_UPLOAD_DIR" => Some(upload_dir.clone()),
        _ => None,
    })
    .expect("Invalid test config")
}

/// A valid creation form for `name`, with an email derived from it.
#[must_use]
pub fn new_user_form(name: &str) -> NewUserForm {
    let slug = name.to_lowercase().replace(' ', ".");
    NewUserForm {
        name: name.to_string(),
        email: format!("{slug}@example.com"),
        phone: "555-0100".to_string(),
        linkedin_url: format!("https://www.linkedin.com/in/{slug}"),
        image: ImageUpload {
            file_name: format!("{slug}.png"),
            bytes: b"\x89PNG fake image".to_vec(),
        },
    }
}
