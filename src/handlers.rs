use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{header, HeaderValue, Request, Response, StatusCode},
    response::IntoResponse,
    routing::{get, MethodRouter},
};
use std::sync::Arc;
use tracing::{debug, info};

use crate::{config::AppConfig, context::RequestContext, error::AppError, proxy::forward_to_upstream};

const ALLOWED_METHODS: &str = "OPTIONS, GET, POST";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// GET / POST / OPTIONS on one path. Any other method gets a 405.
pub fn proxy_routes() -> MethodRouter<Arc<AppConfig>> {
    get(forward_local).post(forward_by_model).options(preflight)
}

/// GET: always served by the local Ollama upstream.
pub async fn forward_local(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
) -> Result<Response<Body>, AppError> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await?;
    forward_to_upstream(&config, &config.ollama, parts, body).await
}

/// POST: the body's `model` decides the upstream.
pub async fn forward_by_model(
    State(config): State<Arc<AppConfig>>,
    request: Request<Body>,
) -> Result<Response<Body>, AppError> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, usize::MAX).await?;

    debug!("Request body: {}", String::from_utf8_lossy(&body));

    let ctx = RequestContext::from_body(body).map_err(|e| {
        info!(path = %parts.uri.path(), error = %e, "Rejecting request");
        e
    })?;

    let target = config.select_endpoint(&ctx.model);
    info!(
        model = %ctx.model,
        upstream = %target.role(),
        endpoint = %target,
        "Routing request"
    );

    forward_to_upstream(&config, target, parts, ctx.body).await
}

/// CORS preflight, answered locally without authentication.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [
            (header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS)),
            (
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                HeaderValue::from_static("*"),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOWED_METHODS),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOWED_HEADERS),
            ),
        ],
    )
}
