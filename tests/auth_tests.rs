//! End-to-end tests for the register/login/logout flows.

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use blogr::config::Config;
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

async fn spawn_app() -> (Arc<blogr::web::AppState>, Router) {
    let db_path =
        std::env::temp_dir().join(format!("blogr-auth-test-{}.sqlite", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_path = Some(db_path.to_string_lossy().to_string());

    let state = blogr::web::create_app_state(config)
        .await
        .expect("failed to create app state");
    let router = blogr::web::router(state.clone());
    (state, router)
}

fn credential_post(uri: &str, username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={username}&password={password}"
        )))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

/// The session cookie pair (`name=value`) from a response, if one was set.
fn session_cookie(response: &Response<axum::body::Body>) -> Option<String> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?;
    let pair = set_cookie.to_str().ok()?.split(';').next()?;
    Some(pair.to_string())
}

async fn body_text(response: Response<axum::body::Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

#[tokio::test]
async fn register_redirects_then_rejects_duplicate() {
    let (state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(credential_post("/auth/register", "alice", "secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/login"
    );

    let response = app
        .clone()
        .oneshot(credential_post("/auth/register", "alice", "secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("User alice is already registered."));

    let users = state.store().count_users().await.unwrap();
    assert_eq!(users, 1);
}

#[tokio::test]
async fn register_requires_username_and_password() {
    let (state, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(credential_post("/auth/register", "", "secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Username is required"));

    let response = app
        .clone()
        .oneshot(credential_post("/auth/register", "bob", ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Password is required"));

    let users = state.store().count_users().await.unwrap();
    assert_eq!(users, 0);
}

#[tokio::test]
async fn login_sets_session_identity() {
    let (_, app) = spawn_app().await;

    app.clone()
        .oneshot(credential_post("/auth/register", "alice", "secret"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(credential_post("/auth/login", "alice", "secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    let cookie = session_cookie(&response).expect("login should set a session cookie");

    let response = app
        .clone()
        .oneshot(get_with_cookie("/me", &cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("alice"));
}

#[tokio::test]
async fn login_with_wrong_password_fails_without_session() {
    let (_, app) = spawn_app().await;

    app.clone()
        .oneshot(credential_post("/auth/register", "alice", "secret"))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(credential_post("/auth/login", "alice", "wrong"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
    assert!(body_text(response).await.contains("Incorrect Password"));
}

#[tokio::test]
async fn login_with_unknown_username_fails() {
    let (_, app) = spawn_app().await;

    let response = app
        .clone()
        .oneshot(credential_post("/auth/login", "nobody", "secret"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
    assert!(body_text(response).await.contains("Incorrect Username"));
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (_, app) = spawn_app().await;

    app.clone()
        .oneshot(credential_post("/auth/register", "alice", "secret"))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(credential_post("/auth/login", "alice", "secret"))
        .await
        .unwrap();
    let cookie = session_cookie(&response).expect("login should set a session cookie");

    let response = app
        .clone()
        .oneshot(get_with_cookie("/auth/logout", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    // The old cookie no longer resolves to a session; protected pages
    // bounce back to the login form.
    let response = app
        .clone()
        .oneshot(get_with_cookie("/me", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/login"
    );
}

#[tokio::test]
async fn protected_view_redirects_anonymous_requests() {
    let (_, app) = spawn_app().await;

    let response = app.clone().oneshot(get("/me")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/login"
    );

    // The redirect short-circuits before the handler: no page content.
    let body = body_text(response).await;
    assert!(!body.contains("Your Account"));
}

#[tokio::test]
async fn stale_session_identity_is_treated_as_anonymous() {
    let (state, app) = spawn_app().await;

    app.clone()
        .oneshot(credential_post("/auth/register", "alice", "secret"))
        .await
        .unwrap();
    let response = app
        .clone()
        .oneshot(credential_post("/auth/login", "alice", "secret"))
        .await
        .unwrap();
    let cookie = session_cookie(&response).expect("login should set a session cookie");

    // Drop every user row out from under the live session.
    state.store().reset().await.unwrap();

    let response = app
        .clone()
        .oneshot(get_with_cookie("/me", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/auth/login"
    );
}
