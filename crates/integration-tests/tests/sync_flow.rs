//! End-to-end tests of the sync controller against a real server.

use std::sync::Arc;

use user_directory_client::presentation::{UserCard, UserForm, UserListView, render_list};
use user_directory_client::{ApiError, LoadState, SyncController, UserApi};
use user_directory_core::UserId;
use user_directory_integration_tests::{TestApp, new_user_form};

async fn seeded(app: &TestApp, names: &[&str]) {
    let api = app.api();
    for name in names {
        api.create_user(&new_user_form(name))
            .await
            .expect("Failed to seed user");
    }
}

#[tokio::test]
async fn test_load_and_search() {
    let app = TestApp::spawn().await;
    seeded(&app, &["Ann"]).await;

    let controller = SyncController::new(Arc::new(app.api()));
    controller.load().await.expect("load failed");

    let state = controller.snapshot();
    assert_eq!(state.load_state(), &LoadState::Ready);
    assert_eq!(state.all_users().len(), 1);
    assert_eq!(state.all_users()[0].name, "Ann");

    controller.set_search_term("ann");
    assert_eq!(controller.snapshot().visible_users().len(), 1);

    controller.set_search_term("bob");
    let state = controller.snapshot();
    assert!(state.visible_users().is_empty());
    assert!(render_list(&state).contains("No users match your search."));
}

#[tokio::test]
async fn test_form_submit_then_insert_created() {
    let app = TestApp::spawn().await;
    seeded(&app, &["Ann"]).await;

    let api = Arc::new(app.api());
    let controller = SyncController::new(api.clone());
    controller.load().await.expect("load failed");

    let mut form = UserForm::new();
    let fields = new_user_form("Bob Stone");
    form.name = fields.name;
    form.email = fields.email;
    form.select_image(fields.image);

    let created = form.submit(api.as_ref()).await.expect("submit failed");
    assert_eq!(form.success(), Some("User created successfully!"));
    controller.insert_created(created);

    let state = controller.snapshot();
    let names: Vec<_> = state.all_users().iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Bob Stone", "Ann"]);

    // The mirror matches what a fresh load returns
    let fresh = api.list_users().await.expect("list failed");
    assert_eq!(state.all_users(), fresh.as_slice());
}

#[tokio::test]
async fn test_update_round_trip() {
    let app = TestApp::spawn().await;
    seeded(&app, &["Ann"]).await;

    let controller = SyncController::new(Arc::new(app.api()));
    controller.load().await.expect("load failed");

    let state = controller.snapshot();
    let mut draft = UserCard::new(&state.all_users()[0]).edit();
    draft.name = "Ann Marie".to_string();
    draft.phone = String::new();
    let edited = draft.finish().expect("valid draft");

    let stored = controller.update(&edited).await.expect("update failed");
    assert_eq!(stored.name, "Ann Marie");
    assert_eq!(stored.phone, None);
    assert_eq!(controller.snapshot().all_users()[0], stored);
}

#[tokio::test]
async fn test_update_of_missing_user_sets_action_error() {
    let app = TestApp::spawn().await;
    seeded(&app, &["Ann"]).await;

    let controller = SyncController::new(Arc::new(app.api()));
    controller.load().await.expect("load failed");
    let before = controller.snapshot();

    let mut ghost = before.all_users()[0].clone();
    ghost.id = UserId::new(999);
    let err = controller.update(&ghost).await.expect_err("update should fail");
    assert!(err.is_not_found());

    let after = controller.snapshot();
    assert_eq!(after.all_users(), before.all_users());
    let message = after.action_error().expect("action error").message();
    assert!(message.to_lowercase().contains("not found"));
}

#[tokio::test]
async fn test_update_to_taken_email_conflicts() {
    let app = TestApp::spawn().await;
    seeded(&app, &["Ann", "Bob"]).await;

    let controller = SyncController::new(Arc::new(app.api()));
    controller.load().await.expect("load failed");

    let state = controller.snapshot();
    let mut bob = state.all_users()[0].clone();
    bob.email = state.all_users()[1].email.clone();

    let err = controller.update(&bob).await.expect_err("update should fail");
    assert!(matches!(err, ApiError::Conflict(_)));
    assert_eq!(
        controller.snapshot().action_error().expect("action error").message(),
        "A user with this email already exists"
    );
}

#[tokio::test]
async fn test_delete_twice() {
    let app = TestApp::spawn().await;
    seeded(&app, &["Ann", "Bob"]).await;

    let controller = SyncController::new(Arc::new(app.api()));
    controller.load().await.expect("load failed");
    let ann = controller.snapshot().all_users()[1].id;

    controller.delete(ann).await.expect("delete failed");
    let state = controller.snapshot();
    assert!(state.all_users().iter().all(|u| u.id != ann));
    assert!(state.visible_users().iter().all(|u| u.id != ann));

    let err = controller.delete(ann).await.expect_err("second delete should fail");
    assert!(err.is_not_found());
    assert_eq!(controller.snapshot().all_users().len(), 1);
}

#[tokio::test]
async fn test_load_failure_when_server_is_gone() {
    let app = TestApp::spawn().await;
    let api = app.api();
    drop(app);
    // Let the runtime drop the aborted server task and its listener
    tokio::task::yield_now().await;

    let controller = SyncController::new(Arc::new(api));
    assert!(controller.load().await.is_err());

    let state = controller.snapshot();
    assert!(matches!(state.load_state(), LoadState::Failed(_)));
    assert!(matches!(
        UserListView::from_state(&state),
        UserListView::Failed { .. }
    ));
}
