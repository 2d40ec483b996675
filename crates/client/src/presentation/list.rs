//! User list view.

use crate::presentation::card::{UserCard, render_card};
use crate::state::{ControllerState, LoadState};

/// Shown when the directory has no records at all.
pub const NO_USERS: &str = "No users found. Add a new user to get started!";

/// Shown when records exist but none matches the search.
pub const NO_MATCHES: &str = "No users match your search.";

/// What the list area shows for a controller state.
#[derive(Debug, Clone)]
pub enum UserListView<'a> {
    Loading,
    /// The last load failed; the user may retry.
    Failed { message: &'a str },
    /// Ready, but nothing to show.
    Empty { message: &'static str },
    Users(Vec<UserCard<'a>>),
}

impl<'a> UserListView<'a> {
    #[must_use]
    pub fn from_state(state: &'a ControllerState) -> Self {
        match state.load_state() {
            LoadState::Loading => Self::Loading,
            LoadState::Failed(message) => Self::Failed {
                message: message.as_str(),
            },
            LoadState::Ready if state.visible_users().is_empty() => Self::Empty {
                message: if state.all_users().is_empty() {
                    NO_USERS
                } else {
                    NO_MATCHES
                },
            },
            LoadState::Ready => Self::Users(state.visible_users().iter().map(UserCard::new).collect()),
        }
    }
}

/// Text block for the whole list, with the search term and any action error.
#[must_use]
pub fn render_list(state: &ControllerState) -> String {
    let mut blocks = Vec::new();

    if let Some(error) = state.action_error() {
        blocks.push(format!("! {}", error.message()));
    }
    if !state.search_term().trim().is_empty() {
        blocks.push(format!("Search: {}", state.search_term()));
    }

    match UserListView::from_state(state) {
        UserListView::Loading => blocks.push("Loading users...".to_string()),
        UserListView::Failed { message } => {
            blocks.push(format!("Error: {message}\nTry again to reload the list."));
        }
        UserListView::Empty { message } => blocks.push(message.to_string()),
        UserListView::Users(cards) => blocks.extend(cards.iter().map(render_card)),
    }

    blocks.join("\n\n")
}
