//! # integration-tests
//!
//! Harness for HTTP-level tests: a real router over the in-memory adapters,
//! real JWTs, and a multipart body builder. The tests drive the service
//! through `tower::ServiceExt::oneshot` without binding a socket.

#![cfg(feature = "web-axum")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;
use uuid::Uuid;

use api_adapters::AppState;
use auth_adapters::{Argon2CredentialHasher, JwtIdentityResolver, JwtTokenIssuer};
use domains::{Role, TokenIssuer, User, UserRepository};
use services::{
    AdBoardService, CreativeService, MediaService, ReconciliationService, UserService,
};
use storage_adapters::memory::{
    MemoryAdBoardRepository, MemoryAdRepository, MemoryBookingRepository, MemoryMediaStorage,
    MemoryUserRepository,
};

pub const JWT_SECRET: &[u8] = b"integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserRepository>,
    pub boards: Arc<MemoryAdBoardRepository>,
    pub ads: Arc<MemoryAdRepository>,
    pub bookings: Arc<MemoryBookingRepository>,
    pub media: Arc<MemoryMediaStorage>,
    issuer: JwtTokenIssuer,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserRepository::new());
        let boards = Arc::new(MemoryAdBoardRepository::new());
        let ads = Arc::new(MemoryAdRepository::new());
        let bookings = Arc::new(MemoryBookingRepository::new());
        let media = Arc::new(MemoryMediaStorage::new());

        let hasher = Arc::new(Argon2CredentialHasher::new());
        let issuer = Arc::new(JwtTokenIssuer::new(JWT_SECRET, 3600));
        let identity = Arc::new(JwtIdentityResolver::new(JWT_SECRET, users.clone()));

        let state = AppState {
            ad_boards: Arc::new(AdBoardService::new(
                boards.clone(),
                bookings.clone(),
                media.clone(),
            )),
            creatives: Arc::new(CreativeService::new(
                ads.clone(),
                boards.clone(),
                bookings.clone(),
                media.clone(),
            )),
            reconciliation: Arc::new(ReconciliationService::new(
                boards.clone(),
                ads.clone(),
                bookings.clone(),
            )),
            users: Arc::new(UserService::new(
                users.clone(),
                media.clone(),
                hasher,
                issuer.clone(),
            )),
            media: Arc::new(MediaService::new(media.clone())),
            identity,
        };

        Self {
            router: api_adapters::router(state),
            users,
            boards,
            ads,
            bookings,
            media,
            issuer: JwtTokenIssuer::new(JWT_SECRET, 3600),
        }
    }

    /// Inserts an account directly and returns it; most tests don't need to
    /// exercise registration to get an identity.
    pub async fn seed_user(&self, name: &str, email: &str, role: Role) -> User {
        let now = Utc::now();
        self.users
            .insert(User {
                id: Uuid::new_v4(),
                name: name.into(),
                email: email.into(),
                password_hash: None,
                profile_pic_url: None,
                role,
                company: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .expect("seed user")
    }

    pub fn token_for(&self, user: &User) -> String {
        self.issuer.issue(user).expect("issue token")
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.expect("infallible")
    }
}

/// Reads a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body is json")
}

pub fn get(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub fn delete(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub fn post_json(path: &str, token: Option<&str>, body: &serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub fn put_json(path: &str, token: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Hand-rolled multipart/form-data encoder.
pub struct MultipartBuilder {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self {
            boundary: format!("----adbazaar-test-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n"
            )
            .as_bytes(),
        );
        self.body
            .extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn build(mut self, method: &str, path: &str, token: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method(method)
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(self.body))
            .expect("request")
    }
}

/// Asserts a response carries the error envelope with the expected status.
pub async fn assert_error(response: Response<Body>, status: StatusCode) {
    assert_eq!(response.status(), status);
    let body = body_json(response).await;
    assert_eq!(body["error"]["status"], status.as_u16());
}
