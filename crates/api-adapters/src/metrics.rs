//! Prometheus exposition for the HTTP surface.

use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use once_cell::sync::Lazy;
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct RequestLabels {
    pub method: String,
    pub status: u32,
}

static HTTP_REQUESTS: Lazy<Family<RequestLabels, Counter>> = Lazy::new(Family::default);

static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::default();
    registry.register(
        "http_requests",
        "HTTP requests handled, by method and status",
        HTTP_REQUESTS.clone(),
    );
    registry
});

pub async fn track_requests(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let response = next.run(request).await;
    HTTP_REQUESTS
        .get_or_create(&RequestLabels {
            method,
            status: response.status().as_u16() as u32,
        })
        .inc();
    response
}

pub async fn exposition() -> Response {
    let mut body = String::new();
    if let Err(err) = encode(&mut body, &REGISTRY) {
        tracing::error!(%err, "metrics encoding failed");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    (
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        body,
    )
        .into_response()
}
