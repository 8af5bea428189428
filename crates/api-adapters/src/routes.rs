//! Route table.
//!
//! Mutation and listing endpoints sit behind the identity layer; only
//! registration, login, and the metrics scrape are public.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::forms::MAX_MULTIPART_BYTES;
use crate::state::AppState;
use crate::{auth, handlers, metrics};

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/adBoard",
            get(handlers::list_ad_boards)
                .post(handlers::create_ad_board)
                .put(handlers::update_ad_board)
                .delete(handlers::delete_ad_board),
        )
        .route(
            "/api/creatives",
            get(handlers::list_creatives).post(handlers::create_creative),
        )
        .route(
            "/api/creative/{id}",
            delete(handlers::delete_creative).put(handlers::reschedule_creative),
        )
        .route("/api/video", post(handlers::presign_video))
        .route(
            "/api/user/{email}",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_identity,
        ));

    Router::new()
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .route("/metrics", get(metrics::exposition))
        .merge(protected)
        .layer(middleware::from_fn(metrics::track_requests))
        .layer(DefaultBodyLimit::max(MAX_MULTIPART_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
