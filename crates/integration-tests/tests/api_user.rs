//! Profile reads and multipart profile updates.

use axum::http::StatusCode;
use domains::Role;
use integration_tests::{assert_error, body_json, get, MultipartBuilder, TestApp};

#[tokio::test]
async fn profile_round_trips_with_company() {
    let app = TestApp::new();
    let user = app.seed_user("Asha", "asha@example.com", Role::Owner).await;
    let token = app.token_for(&user);

    let form = MultipartBuilder::new()
        .text("name", "Asha K")
        .text("companyName", "Pune Hoardings Pvt Ltd");
    let updated = app
        .send(form.build("PUT", "/api/user/asha@example.com", &token))
        .await;
    assert_eq!(updated.status(), StatusCode::OK);

    let profile = app.send(get("/api/user/asha@example.com", &token)).await;
    assert_eq!(profile.status(), StatusCode::OK);
    let body = body_json(profile).await;
    assert_eq!(body["name"], "Asha K");
    assert_eq!(body["company"]["name"], "Pune Hoardings Pvt Ltd");
}

#[tokio::test]
async fn unspecified_fields_keep_their_stored_values() {
    let app = TestApp::new();
    let user = app.seed_user("Asha", "asha@example.com", Role::Owner).await;
    let token = app.token_for(&user);

    let form = MultipartBuilder::new().text("companyName", "Pune Hoardings Pvt Ltd");
    app.send(form.build("PUT", "/api/user/asha@example.com", &token)).await;

    let body = body_json(app.send(get("/api/user/asha@example.com", &token)).await).await;
    assert_eq!(body["name"], "Asha");
}

#[tokio::test]
async fn a_profile_picture_is_uploaded_and_linked() {
    let app = TestApp::new();
    let user = app.seed_user("Asha", "asha@example.com", Role::Owner).await;
    let token = app.token_for(&user);

    let form = MultipartBuilder::new().file(
        "profilePic",
        "me.png",
        "image/png",
        b"png bytes",
    );
    let response = app
        .send(form.build("PUT", "/api/user/asha@example.com", &token))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let url = body["profile_pic_url"].as_str().unwrap();
    assert!(app.media.contains(url));
}

#[tokio::test]
async fn an_oversized_profile_picture_is_rejected() {
    let app = TestApp::new();
    let user = app.seed_user("Asha", "asha@example.com", Role::Owner).await;
    let token = app.token_for(&user);

    let oversized = vec![0u8; 5 * 1024 * 1024 + 1];
    let form = MultipartBuilder::new().file("profilePic", "me.png", "image/png", &oversized);
    let response = app
        .send(form.build("PUT", "/api/user/asha@example.com", &token))
        .await;
    assert_error(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(app.media.object_count(), 0);
}

#[tokio::test]
async fn unknown_profiles_are_not_found() {
    let app = TestApp::new();
    let user = app.seed_user("Asha", "asha@example.com", Role::Owner).await;
    let token = app.token_for(&user);

    let response = app.send(get("/api/user/ghost@example.com", &token)).await;
    assert_error(response, StatusCode::NOT_FOUND).await;
}
