//! Sync controller: the client-side owner of the user list.
//!
//! The controller mirrors the server's records locally and reconciles each
//! mutation response into that mirror, so views never need a full reload.
//!
//! # Rules
//!
//! - Only [`SyncController::load`] touches the load state.
//! - A failed update or delete leaves the mirror untouched and raises an
//!   action error instead.
//! - An action error clears itself after [`ACTION_ERROR_TTL`]. A newer error
//!   restarts the clock; the timer of an older error never clears a newer one.
//! - Responses for records that are no longer mirrored are dropped, so a
//!   late update cannot resurrect a deleted record.
//!
//! State changes are published through a `tokio::sync::watch` channel; views
//! call [`SyncController::subscribe`] and re-render on every change.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tracing::instrument;

use user_directory_core::{UpdateUserRequest, User, UserId};

use crate::api::UserApi;
use crate::error::ApiError;
use crate::state::{ActionError, ControllerState, LoadState};

/// How long an action error stays visible.
pub const ACTION_ERROR_TTL: Duration = Duration::from_secs(5);

pub const LOAD_FAILED: &str = "Failed to fetch users";
pub const UPDATE_FAILED: &str = "Failed to update user";
pub const DELETE_FAILED: &str = "Failed to delete user";

/// Keeps a local, searchable mirror of the directory in sync with the API.
pub struct SyncController {
    api: Arc<dyn UserApi>,
    state: Arc<watch::Sender<ControllerState>>,
    error_seq: AtomicU64,
}

impl SyncController {
    /// Create a controller with an empty mirror in the loading state.
    #[must_use]
    pub fn new(api: Arc<dyn UserApi>) -> Self {
        let (state, _) = watch::channel(ControllerState::default());
        Self {
            api,
            state: Arc::new(state),
            error_seq: AtomicU64::new(0),
        }
    }

    /// Observe every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    /// Clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    /// Fetch every record and replace the mirror.
    ///
    /// On failure the previous mirror is kept and the load state becomes
    /// `Failed`.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), ApiError> {
        self.state
            .send_modify(|state| state.set_load_state(LoadState::Loading));

        match self.api.list_users().await {
            Ok(users) => {
                tracing::debug!(count = users.len(), "Loaded users");
                self.state.send_modify(|state| {
                    state.replace_all(users);
                    state.set_load_state(LoadState::Ready);
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load users");
                let message = e.user_message(LOAD_FAILED);
                self.state
                    .send_modify(|state| state.set_load_state(LoadState::Failed(message)));
                Err(e)
            }
        }
    }

    /// Add a record created elsewhere (the creation form) to the front.
    pub fn insert_created(&self, user: User) {
        self.state.send_modify(|state| state.prepend(user));
    }

    /// Save the full current fields of `user`.
    ///
    /// On success the mirrored record is replaced by the server's copy and
    /// that copy is returned.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request after raising it as the
    /// action error.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn update(&self, user: &User) -> Result<User, ApiError> {
        let request = UpdateUserRequest::from_user(user);

        match self.api.update_user(user.id, &request).await {
            Ok(updated) => {
                let stored = updated.clone();
                let applied = self
                    .state
                    .send_if_modified(|state| state.replace(user.id, stored));
                if !applied {
                    tracing::debug!("Dropped update for a record no longer listed");
                }
                Ok(updated)
            }
            Err(e) => {
                self.raise(e.user_message(UPDATE_FAILED));
                Err(e)
            }
        }
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns the `ApiError` of the failed request after raising it as the
    /// action error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: UserId) -> Result<(), ApiError> {
        match self.api.delete_user(id).await {
            Ok(_) => {
                self.state.send_if_modified(|state| state.remove(id));
                Ok(())
            }
            Err(e) => {
                self.raise(e.user_message(DELETE_FAILED));
                Err(e)
            }
        }
    }

    /// Change the search term. Never touches the network.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        self.state.send_modify(|state| state.set_search_term(term));
    }

    /// Clear the action error now.
    pub fn dismiss_error(&self) {
        self.state.send_if_modified(ControllerState::clear_action_error);
    }

    /// Show `message` as the action error and schedule its expiry.
    fn raise(&self, message: String) {
        let seq = self.error_seq.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::warn!(seq, message = %message, "Action failed");

        self.state
            .send_modify(|state| state.set_action_error(ActionError::new(message, seq)));

        let state = Arc::downgrade(&self.state);
        tokio::spawn(async move {
            tokio::time::sleep(ACTION_ERROR_TTL).await;
            if let Some(state) = state.upgrade() {
                state.send_if_modified(|state| state.expire_action_error(seq));
            }
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockall::predicate::eq;
    use user_directory_core::{DeletedResponse, ErrorBody};

    use super::*;
    use crate::api::MockUserApi;
    use crate::state::tests::user;

    fn controller(api: MockUserApi) -> SyncController {
        SyncController::new(Arc::new(api))
    }

    fn names(users: &[User]) -> Vec<&str> {
        users.iter().map(|u| u.name.as_str()).collect()
    }

    async fn loaded(mut api: MockUserApi, users: Vec<User>) -> SyncController {
        api.expect_list_users()
            .times(1)
            .returning(move || Ok(users.clone()));
        let controller = controller(api);
        controller.load().await.unwrap();
        controller
    }

    fn not_found() -> ApiError {
        ApiError::NotFound(Some(ErrorBody::new("User not found")))
    }

    #[tokio::test]
    async fn test_starts_loading_and_empty() {
        let snapshot = controller(MockUserApi::new()).snapshot();
        assert_eq!(snapshot.load_state(), &LoadState::Loading);
        assert!(snapshot.all_users().is_empty());
        assert!(snapshot.action_error().is_none());
    }

    #[tokio::test]
    async fn test_load_then_search() {
        let controller = loaded(MockUserApi::new(), vec![user(1, "Ann")]).await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.load_state(), &LoadState::Ready);
        assert_eq!(names(snapshot.all_users()), ["Ann"]);

        controller.set_search_term("ann");
        assert_eq!(names(controller.snapshot().visible_users()), ["Ann"]);

        controller.set_search_term("bob");
        let snapshot = controller.snapshot();
        assert!(snapshot.visible_users().is_empty());
        assert_eq!(snapshot.all_users().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous_users() {
        let mut api = MockUserApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_list_users()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![user(1, "Ann")]));
        api.expect_list_users()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(ApiError::Transport("connection refused".to_string())));
        let controller = controller(api);

        controller.load().await.unwrap();
        assert!(controller.load().await.is_err());

        let snapshot = controller.snapshot();
        assert_eq!(
            snapshot.load_state(),
            &LoadState::Failed("Failed to fetch users: connection refused".to_string())
        );
        assert_eq!(names(snapshot.all_users()), ["Ann"]);
        assert!(snapshot.action_error().is_none());
    }

    #[tokio::test]
    async fn test_insert_created_prepends() {
        let controller = loaded(MockUserApi::new(), vec![user(1, "Ann")]).await;
        controller.insert_created(user(2, "Bob"));
        assert_eq!(names(controller.snapshot().all_users()), ["Bob", "Ann"]);
    }

    #[tokio::test]
    async fn test_update_replaces_with_server_copy() {
        let mut api = MockUserApi::new();
        api.expect_update_user()
            .withf(|id, request| {
                *id == UserId::new(1)
                    && request.name.as_deref() == Some("Ann B")
                    && request.phone.as_deref() == Some("")
            })
            .times(1)
            .returning(|_, _| {
                let mut stored = user(1, "Ann B");
                stored.profile_image = "/uploads/server.png".to_string();
                Ok(stored)
            });
        let controller = loaded(api, vec![user(1, "Ann"), user(2, "Bob")]).await;

        let mut edited = user(1, "Ann B");
        edited.profile_image = "/uploads/local.png".to_string();
        let returned = controller.update(&edited).await.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.all_users()[0], returned);
        assert_eq!(snapshot.all_users()[0].profile_image, "/uploads/server.png");
        assert_eq!(names(snapshot.visible_users()), ["Ann B", "Bob"]);
    }

    #[tokio::test]
    async fn test_update_not_found_raises_error() {
        let mut api = MockUserApi::new();
        api.expect_update_user().returning(|_, _| Err(not_found()));
        let controller = loaded(api, vec![user(1, "Ann")]).await;
        let before = controller.snapshot();

        let err = controller.update(&user(1, "Renamed")).await.unwrap_err();
        assert!(err.is_not_found());

        let after = controller.snapshot();
        assert_eq!(after.all_users(), before.all_users());
        assert_eq!(after.visible_users(), before.visible_users());
        let message = after.action_error().unwrap().message().to_lowercase();
        assert!(message.contains("not found"));
    }

    #[tokio::test]
    async fn test_update_without_body_uses_generic_message() {
        let mut api = MockUserApi::new();
        api.expect_update_user().returning(|_, _| {
            Err(ApiError::Server {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: None,
            })
        });
        let controller = loaded(api, vec![user(1, "Ann")]).await;

        controller.update(&user(1, "Ann")).await.unwrap_err();
        assert_eq!(
            controller.snapshot().action_error().unwrap().message(),
            "Failed to update user"
        );
    }

    #[tokio::test]
    async fn test_late_update_does_not_resurrect_deleted_record() {
        let mut api = MockUserApi::new();
        api.expect_update_user()
            .returning(|_, _| Ok(user(2, "Bob Updated")));
        let controller = loaded(api, vec![user(1, "Ann")]).await;

        controller.update(&user(2, "Bob")).await.unwrap();
        assert_eq!(names(controller.snapshot().all_users()), ["Ann"]);
    }

    /// Answers deletes at once but holds every update until a delete has
    /// been answered, so overlapping calls resolve in reverse order.
    struct DeleteFirstApi {
        users: Vec<User>,
        deleted: tokio::sync::Notify,
    }

    #[async_trait::async_trait]
    impl UserApi for DeleteFirstApi {
        async fn list_users(&self) -> Result<Vec<User>, ApiError> {
            Ok(self.users.clone())
        }

        async fn create_user(&self, _form: &crate::NewUserForm) -> Result<User, ApiError> {
            unreachable!("create is not used here")
        }

        async fn update_user(
            &self,
            id: UserId,
            request: &UpdateUserRequest,
        ) -> Result<User, ApiError> {
            self.deleted.notified().await;
            let mut stored = user(id.as_i32(), request.name.as_deref().unwrap());
            stored.profile_image = "/uploads/server.png".to_string();
            Ok(stored)
        }

        async fn delete_user(&self, _id: UserId) -> Result<DeletedResponse, ApiError> {
            self.deleted.notify_one();
            Ok(DeletedResponse {
                message: "User deleted successfully".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_overlapping_update_and_delete_both_apply() {
        let api = DeleteFirstApi {
            users: vec![user(1, "Ann"), user(2, "Bob"), user(3, "Cy")],
            deleted: tokio::sync::Notify::new(),
        };
        let controller = SyncController::new(Arc::new(api));
        controller.load().await.unwrap();

        let edited = user(1, "Ann B");
        let (updated, deleted) = tokio::join!(
            controller.update(&edited),
            controller.delete(UserId::new(2)),
        );
        updated.unwrap();
        deleted.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(names(snapshot.all_users()), ["Ann B", "Cy"]);
        assert_eq!(names(snapshot.visible_users()), ["Ann B", "Cy"]);
        assert_eq!(snapshot.all_users()[0].profile_image, "/uploads/server.png");
        assert!(snapshot.action_error().is_none());
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let mut api = MockUserApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_delete_user()
            .with(eq(UserId::new(1)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(DeletedResponse {
                    message: "User deleted successfully".to_string(),
                })
            });
        api.expect_delete_user()
            .with(eq(UserId::new(1)))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(not_found()));
        let controller = loaded(api, vec![user(1, "Ann"), user(2, "Bob")]).await;

        controller.delete(UserId::new(1)).await.unwrap();
        let snapshot = controller.snapshot();
        assert_eq!(names(snapshot.all_users()), ["Bob"]);
        assert_eq!(names(snapshot.visible_users()), ["Bob"]);

        let err = controller.delete(UserId::new(1)).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(names(controller.snapshot().all_users()), ["Bob"]);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_users() {
        let mut api = MockUserApi::new();
        api.expect_delete_user().returning(|_| {
            Err(ApiError::Server {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                body: None,
            })
        });
        let controller = loaded(api, vec![user(1, "Ann")]).await;

        controller.delete(UserId::new(1)).await.unwrap_err();
        let snapshot = controller.snapshot();
        assert_eq!(names(snapshot.all_users()), ["Ann"]);
        assert_eq!(
            snapshot.action_error().unwrap().message(),
            "Failed to delete user"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_error_expires() {
        let mut api = MockUserApi::new();
        api.expect_update_user().returning(|_, _| Err(not_found()));
        let controller = loaded(api, vec![user(1, "Ann")]).await;

        controller.update(&user(1, "Ann")).await.unwrap_err();

        tokio::time::sleep(ACTION_ERROR_TTL - Duration::from_millis(1)).await;
        assert!(controller.snapshot().action_error().is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(controller.snapshot().action_error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_error_gets_its_own_timeout() {
        let mut api = MockUserApi::new();
        let mut seq = mockall::Sequence::new();
        api.expect_update_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(not_found()));
        api.expect_update_user()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(ApiError::Conflict(Some(ErrorBody::new("taken")))));
        let controller = loaded(api, vec![user(1, "Ann")]).await;

        controller.update(&user(1, "Ann")).await.unwrap_err();
        tokio::time::sleep(Duration::from_secs(3)).await;
        controller.update(&user(1, "Ann")).await.unwrap_err();

        // The first error's timer fires here but must not clear the second
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(controller.snapshot().action_error().unwrap().message(), "taken");

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(controller.snapshot().action_error().is_none());
    }

    #[tokio::test]
    async fn test_dismiss_error() {
        let mut api = MockUserApi::new();
        api.expect_delete_user().returning(|_| Err(not_found()));
        let controller = loaded(api, vec![user(1, "Ann")]).await;

        controller.delete(UserId::new(1)).await.unwrap_err();
        assert!(controller.snapshot().action_error().is_some());

        controller.dismiss_error();
        assert!(controller.snapshot().action_error().is_none());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let controller = loaded(MockUserApi::new(), vec![user(1, "Ann")]).await;
        let mut rx = controller.subscribe();
        rx.mark_unchanged();

        controller.set_search_term("zzz");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().search_term(), "zzz");

        // Dismissing with nothing to dismiss is not a change
        controller.dismiss_error();
        assert!(!rx.has_changed().unwrap());
    }
}
