use super::*;
use crate::net::types::User;
use crate::test_helpers::*;
use std::sync::{Arc, Mutex};

async fn session_for(router: axum::Router) -> Session {
    let base = spawn_backend(router).await;
    let client = ApiClient::new(&config_for(&base)).unwrap();
    Session::new(client, AuthStore::new())
}

#[tokio::test]
async fn login_publishes_user_to_store() {
    let session = session_for(backend()).await;
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _sub = session.store().subscribe(move |state| {
        sink.lock().unwrap().push((state.user().map(|u| u.id), state.is_authenticated()));
    });

    let response = session.login(EMAIL, PASSWORD).await.unwrap();

    let expected = User { id: 1, email: EMAIL.into(), is_active: true };
    assert_eq!(response.user, expected);
    assert_eq!(session.store().user(), Some(expected));
    assert!(session.store().is_authenticated());
    assert_eq!(*seen.lock().unwrap(), vec![(None, false), (Some(1), true)]);
}

#[tokio::test]
async fn failed_login_leaves_store_untouched() {
    let session = session_for(backend()).await;

    let err = session.login(EMAIL, "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!session.store().is_authenticated());
}

#[tokio::test]
async fn failed_login_keeps_previous_user() {
    let session = session_for(backend()).await;
    session.login(EMAIL, PASSWORD).await.unwrap();

    assert!(session.login("other@b.com", "x").await.is_err());
    assert_eq!(session.store().user().map(|u| u.id), Some(1));
}

#[tokio::test]
async fn register_does_not_sign_in() {
    let session = session_for(backend()).await;

    let body = session.register("new@b.com", "pw").await.unwrap();
    assert_eq!(body["email"], "new@b.com");
    assert!(!session.store().is_authenticated());
}

#[tokio::test]
async fn logout_clears_store() {
    let session = session_for(backend()).await;
    session.login(EMAIL, PASSWORD).await.unwrap();

    session.logout().await.unwrap();
    assert!(session.store().user().is_none());
    assert!(!session.store().is_authenticated());
}

#[tokio::test]
async fn logout_clears_store_even_when_server_fails() {
    let session = session_for(failing_backend()).await;
    session.store().set_user(Some(User { id: 9, email: "z@b.com".into(), is_active: true }));

    let err = session.logout().await.unwrap_err();
    assert_eq!(err.to_string(), "Logout failed");
    assert!(!session.store().is_authenticated());
}

#[tokio::test]
async fn logout_clears_store_when_backend_unreachable() {
    let base = dead_base_url().await;
    let session = Session::new(ApiClient::new(&config_for(&base)).unwrap(), AuthStore::new());
    session.store().set_user(Some(User { id: 9, email: "z@b.com".into(), is_active: true }));

    assert!(session.logout().await.is_err());
    assert!(session.store().user().is_none());
}

#[tokio::test]
async fn session_resources_use_login_cookie() {
    let session = session_for(backend()).await;
    session.login(EMAIL, PASSWORD).await.unwrap();

    let routines = session.client().routines().list().await.unwrap();
    assert_eq!(routines.len(), 2);
}
