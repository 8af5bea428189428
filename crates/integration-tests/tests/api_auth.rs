//! Registration, login, and the identity layer.

use axum::http::StatusCode;
use domains::Role;
use integration_tests::{assert_error, body_json, get, post_json, TestApp};
use serde_json::json;

#[tokio::test]
async fn register_creates_the_user_and_company() {
    let app = TestApp::new();
    let response = app
        .send(post_json(
            "/api/auth/register",
            None,
            &json!({
                "name": "Asha",
                "email": "asha@example.com",
                "password": "hunter2hunter2",
                "role": "Owner",
                "companyName": "Pune Hoardings Pvt Ltd",
            }),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["email"], "asha@example.com");
    assert_eq!(body["role"], "Owner");
    assert_eq!(body["company"]["name"], "Pune Hoardings Pvt Ltd");
    // The hash never leaves the server.
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = TestApp::new();
    let request = json!({
        "name": "Asha",
        "email": "asha@example.com",
        "password": "hunter2hunter2",
    });

    let first = app.send(post_json("/api/auth/register", None, &request)).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.send(post_json("/api/auth/register", None, &request)).await;
    assert_error(second, StatusCode::CONFLICT).await;
}

#[tokio::test]
async fn owner_registration_requires_a_company() {
    let app = TestApp::new();
    let response = app
        .send(post_json(
            "/api/auth/register",
            None,
            &json!({
                "name": "Asha",
                "email": "asha@example.com",
                "password": "hunter2hunter2",
                "role": "Owner",
            }),
        ))
        .await;
    assert_error(response, StatusCode::BAD_REQUEST).await;
}

#[tokio::test]
async fn login_token_opens_protected_routes() {
    let app = TestApp::new();
    app.send(post_json(
        "/api/auth/register",
        None,
        &json!({
            "name": "Ravi",
            "email": "ravi@example.com",
            "password": "s3cretpassword",
        }),
    ))
    .await;

    let login = app
        .send(post_json(
            "/api/auth/login",
            None,
            &json!({ "email": "ravi@example.com", "password": "s3cretpassword" }),
        ))
        .await;
    assert_eq!(login.status(), StatusCode::OK);
    let body = body_json(login).await;
    let token = body["token"].as_str().expect("token").to_owned();

    let boards = app.send(get("/api/adBoard", &token)).await;
    assert_eq!(boards.status(), StatusCode::OK);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.send(post_json(
        "/api/auth/register",
        None,
        &json!({
            "name": "Ravi",
            "email": "ravi@example.com",
            "password": "s3cretpassword",
        }),
    ))
    .await;

    let login = app
        .send(post_json(
            "/api/auth/login",
            None,
            &json!({ "email": "ravi@example.com", "password": "wrong" }),
        ))
        .await;
    assert_error(login, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
async fn protected_routes_reject_missing_and_garbage_tokens() {
    let app = TestApp::new();

    let bare = axum::http::Request::builder()
        .method("GET")
        .uri("/api/adBoard")
        .body(axum::body::Body::empty())
        .unwrap();
    assert_error(app.send(bare).await, StatusCode::UNAUTHORIZED).await;

    let garbage = app.send(get("/api/adBoard", "not-a-jwt")).await;
    assert_error(garbage, StatusCode::UNAUTHORIZED).await;
}

#[tokio::test]
async fn tokens_of_deleted_accounts_stop_working() {
    let app = TestApp::new();
    let ghost = app.seed_user("Ghost", "ghost@example.com", Role::Advertiser).await;
    let token = app.token_for(&ghost);

    // Simulate the account disappearing between issuance and use.
    let fresh = TestApp::new();
    let response = fresh.send(get("/api/adBoard", &token)).await;
    assert_error(response, StatusCode::UNAUTHORIZED).await;
}
