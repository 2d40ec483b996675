//! Observable state of the sync controller.

use user_directory_core::{User, UserId};

/// Progress of the last full load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    /// A load is in flight (also the state before the first load).
    #[default]
    Loading,
    /// The last load succeeded.
    Ready,
    /// The last load failed with this message.
    Failed(String),
}

/// A transient error from a mutation, cleared after a timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionError {
    message: String,
    seq: u64,
}

impl ActionError {
    pub(crate) const fn new(message: String, seq: u64) -> Self {
        Self { message, seq }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Sequence number; every raised error gets a new one.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }
}

/// Snapshot of everything the views render.
///
/// `visible_users` is always `all_users` filtered by the search term, so the
/// two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    all_users: Vec<User>,
    search_term: String,
    visible_users: Vec<User>,
    load_state: LoadState,
    action_error: Option<ActionError>,
}

impl ControllerState {
    /// Local mirror of every record, in server order.
    #[must_use]
    pub fn all_users(&self) -> &[User] {
        &self.all_users
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Records whose name matches the search term.
    #[must_use]
    pub fn visible_users(&self) -> &[User] {
        &self.visible_users
    }

    #[must_use]
    pub const fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    #[must_use]
    pub const fn action_error(&self) -> Option<&ActionError> {
        self.action_error.as_ref()
    }

    pub(crate) fn set_load_state(&mut self, load_state: LoadState) {
        self.load_state = load_state;
    }

    pub(crate) fn replace_all(&mut self, users: Vec<User>) {
        self.all_users = users;
        self.refresh_visible();
    }

    /// Put a record at the front, dropping any stale copy with the same id.
    pub(crate) fn prepend(&mut self, user: User) {
        self.all_users.retain(|u| u.id != user.id);
        self.all_users.insert(0, user);
        self.refresh_visible();
    }

    /// Replace the record with `id`. Returns `false` if it is not mirrored.
    pub(crate) fn replace(&mut self, id: UserId, user: User) -> bool {
        let Some(slot) = self.all_users.iter_mut().find(|u| u.id == id) else {
            return false;
        };
        *slot = user;
        self.refresh_visible();
        true
    }

    /// Remove the record with `id`. Returns `false` if it is not mirrored.
    pub(crate) fn remove(&mut self, id: UserId) -> bool {
        let before = self.all_users.len();
        self.all_users.retain(|u| u.id != id);
        if self.all_users.len() == before {
            return false;
        }
        self.refresh_visible();
        true
    }

    pub(crate) fn set_search_term(&mut self, term: String) {
        self.search_term = term;
        self.refresh_visible();
    }

    pub(crate) fn set_action_error(&mut self, error: ActionError) {
        self.action_error = Some(error);
    }

    /// Clear the action error, but only if it is still error `seq`.
    pub(crate) fn expire_action_error(&mut self, seq: u64) -> bool {
        if self.action_error.as_ref().is_some_and(|e| e.seq == seq) {
            self.action_error = None;
            return true;
        }
        false
    }

    pub(crate) fn clear_action_error(&mut self) -> bool {
        self.action_error.take().is_some()
    }

    fn refresh_visible(&mut self) {
        self.visible_users = filter_by_name(&self.all_users, &self.search_term);
    }
}

/// Case-insensitive substring match on the name.
///
/// A blank term matches every record.
#[must_use]
pub fn filter_by_name(users: &[User], term: &str) -> Vec<User> {
    if term.trim().is_empty() {
        return users.to_vec();
    }

    let needle = term.to_lowercase();
    users
        .iter()
        .filter(|user| user.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
