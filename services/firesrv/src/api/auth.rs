//! API key authentication middleware

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use common::AppError;
use tracing::warn;

use super::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Accepts `Authorization: Bearer <key>` or `X-API-Key: <key>`
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    bearer.or_else(|| {
        headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
    })
}

pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.api.require_auth {
        return Ok(next.run(request).await);
    }

    let Some(key) = presented_key(request.headers()) else {
        return Err(AppError::unauthorized("Missing API key"));
    };

    // Compared by SHA-256 digest; raw keys are never stored
    if state.keys.validate(key).await?.is_none() {
        warn!("Rejected invalid API key for {}", request.uri().path());
        return Err(AppError::unauthorized("Invalid API key"));
    }

    Ok(next.run(request).await)
}
