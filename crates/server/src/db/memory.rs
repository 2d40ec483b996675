//! In-memory user repository for tests.
//!
//! Mirrors the `PostgreSQL` adapter's contract: sequential IDs starting at 1,
//! unique emails, newest-first listing.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use user_directory_core::{User, UserId};

use super::{DUPLICATE_EMAIL_MESSAGE, RepositoryError, UserRepository};
use crate::models::{NewUser, UserChanges};

#[derive(Debug, Default)]
struct Store {
    next_id: i32,
    /// Newest first.
    users: Vec<User>,
}

impl Store {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|u| u.email.as_str() == email && Some(u.id) != except)
    }
}

/// Repository backed by a mutex-guarded vector.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    store: Mutex<Store>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.store.lock().await.users.clone())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let store = self.store.lock().await;
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut store = self.store.lock().await;
        if store.email_taken(user.email.as_str(), None) {
            return Err(RepositoryError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_owned()));
        }

        store.next_id += 1;
        let created = User {
            id: UserId::new(store.next_id),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            linkedin_url: user.linkedin_url.clone(),
            profile_image: user.profile_image.clone(),
            created_at: Utc::now(),
        };
        store.users.insert(0, created.clone());
        Ok(created)
    }

    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, RepositoryError> {
        let mut store = self.store.lock().await;
        let index = store
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(email) = &changes.email
            && store.email_taken(email.as_str(), Some(id))
        {
            return Err(RepositoryError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_owned()));
        }

        let user = &mut store.users[index];
        changes.apply(user);
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<User, RepositoryError> {
        let mut store = self.store.lock().await;
        let index = store
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(RepositoryError::NotFound)?;
        Ok(store.users.remove(index))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
