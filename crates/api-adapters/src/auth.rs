//! Bearer-token identity layer.
//!
//! Every protected route runs through [`require_identity`]; handlers then
//! read the resolved account from the request extensions and pass it into
//! the services explicitly.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use domains::User;

use crate::error::ApiError;
use crate::state::AppState;

/// The account a request is acting as.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request)
        .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?
        .to_owned();

    let user = state
        .identity
        .resolve(&token)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized("invalid or expired token"))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
}
