//! Request handlers.
//!
//! Thin coordination between the HTTP types and the services: parse into a
//! typed command, hand it the acting user, map the result.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use domains::{Ad, AdBoard, Booking, Placement, Role, User};
use services::commands::{DateWindow, RegisterUser, UpdateProfile};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::forms;
use crate::state::AppState;

// ── Ad boards ────────────────────────────────────────────────────────────────

pub async fn list_ad_boards(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<AdBoard>>> {
    Ok(Json(state.ad_boards.list(&user).await?))
}

pub async fn create_ad_board(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<AdBoard>)> {
    let cmd = forms::ad_board_create(multipart).await?;
    let board = state.ad_boards.create(cmd, &user).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn update_ad_board(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<Json<AdBoard>> {
    let cmd = forms::ad_board_update(multipart).await?;
    Ok(Json(state.ad_boards.update(cmd, &user).await?))
}

#[derive(Debug, Deserialize)]
pub struct DeleteBoardQuery {
    pub id: Uuid,
}

pub async fn delete_ad_board(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<DeleteBoardQuery>,
) -> ApiResult<StatusCode> {
    state.ad_boards.delete(query.id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── Creatives ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativesQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl CreativesQuery {
    fn window(&self) -> Result<DateWindow, ApiError> {
        let parse = |raw: &Option<String>, field| -> Result<Option<NaiveDate>, ApiError> {
            raw.as_deref()
                .map(|r| forms::parse_date(r, field))
                .transpose()
        };
        Ok(DateWindow {
            start: parse(&self.start_date, "startDate")?,
            end: parse(&self.end_date, "endDate")?,
        })
    }
}

pub async fn list_creatives(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<CreativesQuery>,
) -> ApiResult<Json<Vec<Placement>>> {
    let window = query.window()?;
    Ok(Json(state.reconciliation.placements(window, &user).await?))
}

#[derive(Debug, Serialize)]
pub struct CreatedCreative {
    pub ad: Ad,
    pub booking: Booking,
}

pub async fn create_creative(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<CreatedCreative>)> {
    let cmd = forms::creative_create(multipart).await?;
    let (ad, booking) = state.creatives.create(cmd, &user).await?;
    Ok((StatusCode::CREATED, Json(CreatedCreative { ad, booking })))
}

pub async fn delete_creative(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    state.creatives.delete(id, &user).await?;
    Ok(Json(json!({ "message": "Ad deleted successfully" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub ad_display_start_date: String,
    pub ad_display_end_date: String,
}

pub async fn reschedule_creative(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RescheduleRequest>,
) -> ApiResult<StatusCode> {
    let start = forms::parse_date(&request.ad_display_start_date, "adDisplayStartDate")?;
    let end = forms::parse_date(&request.ad_display_end_date, "adDisplayEndDate")?;
    state.creatives.reschedule(id, start, end, &user).await?;
    Ok(StatusCode::OK)
}

// ── Video upload handshake ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PresignResponse {
    pub url: String,
}

pub async fn presign_video(
    State(state): State<AppState>,
    Json(request): Json<PresignRequest>,
) -> ApiResult<Json<PresignResponse>> {
    let file_name = request
        .file_name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("missing fileName in request body"))?;
    let url = state.media.presign_video_upload(&file_name).await?;
    Ok(Json(PresignResponse { url }))
}

// ── Users ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// "Owner" or "Advertiser"; advertisers are the default.
    pub role: Option<String>,
    pub company_name: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let role = match request.role.as_deref() {
        Some(raw) => Role::parse(raw)?,
        None => Role::Advertiser,
    };
    let user = state
        .users
        .register(RegisterUser {
            name: request.name,
            email: request.email,
            password: request.password,
            role,
            company_name: request.company_name,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let (user, token) = state.users.login(&request.email, &request.password).await?;
    Ok(Json(LoginResponse { token, user }))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.users.profile(&email).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<User>> {
    let cmd: UpdateProfile = forms::profile_update(multipart).await?;
    Ok(Json(state.users.update_profile(&email, cmd).await?))
}
