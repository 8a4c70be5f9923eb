//! Shared-secret bearer authentication.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::{config::AppConfig, error::AppError};

/// Rejects gated requests that do not present the configured bearer token.
///
/// OPTIONS requests always pass so preflights work from browsers. When no
/// token is configured every request passes.
pub async fn bearer_auth(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let Some(expected) = config.api_key.as_deref() else {
        return next.run(request).await;
    };

    let rejection = match bearer_token(request.headers()) {
        Some(token) if constant_time_eq(token, expected) => None,
        Some(_) => Some("Rejected invalid bearer token"),
        None => Some("Missing bearer token"),
    };

    match rejection {
        None => next.run(request).await,
        Some(reason) => {
            warn!(method = %request.method(), path = %request.uri().path(), "{}", reason);
            AppError::Unauthorized.into_response()
        }
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
