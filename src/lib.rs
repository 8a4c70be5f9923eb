//! Reverse proxy that sends chat/completion traffic to OpenAI or a local
//! Ollama server depending on the requested model.
//!
//! Request pipeline: trace span, bearer auth (skipped for OPTIONS), then a
//! per-method handler. POST bodies are inspected for `model`, the endpoint is
//! selected, the URL is re-rooted on that endpoint and the request is
//! forwarded with its headers and body intact.

use axum::{body::Body, http::Request, middleware::from_fn_with_state, Router};
use std::sync::Arc;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

pub mod auth;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod handlers;
pub mod proxy;

pub use config::AppConfig;
pub use endpoint::{ModelClassifier, Upstream, UpstreamTarget};
pub use error::AppError;

/// Builds the full router for `config`.
pub fn app(config: Arc<AppConfig>) -> Router {
    let routes = handlers::proxy_routes();

    Router::new()
        .route("/", routes.clone())
        .route("/*path", routes)
        .layer(from_fn_with_state(config.clone(), auth::bearer_auth))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        id = %Uuid::new_v4(),
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(config)
}
