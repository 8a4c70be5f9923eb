use axum::{
    body::{Body, Bytes},
    http::{header, request::Parts, HeaderValue, Response},
};
use futures_util::StreamExt;
use tracing::{debug, error};

use crate::{config::AppConfig, endpoint::UpstreamTarget, error::AppError};

mod client;
mod rewrite;

pub use client::CLIENT;
pub use rewrite::rewrite_url;

/// Forwards one inbound request to `target` and relays the upstream response.
///
/// The outbound request keeps the inbound method, every inbound header and the
/// body bytes unchanged. The only header that is replaced is `Host`, which is
/// set from [`AppConfig::host_header_for`]. Upstream failures are returned as
/// [`AppError::Upstream`] and never retried.
pub async fn forward_to_upstream(
    config: &AppConfig,
    target: &UpstreamTarget,
    parts: Parts,
    body: Bytes,
) -> Result<Response<Body>, AppError> {
    let uri = rewrite_url(&parts.uri, target)?;
    let url = reqwest::Url::parse(&uri.to_string())
        .map_err(|e| AppError::InvalidUrl(format!("{}: {}", uri, e)))?;

    let host = config.host_header_for(target);
    let mut headers = parts.headers;
    headers.insert(
        header::HOST,
        HeaderValue::from_str(&host)
            .map_err(|_| AppError::InvalidUrl(format!("invalid host header value {:?}", host)))?,
    );

    debug!(
        upstream = %target.role(),
        method = %parts.method,
        url = %url,
        host = %host,
        body_bytes = body.len(),
        "Forwarding request"
    );

    let response = CLIENT
        .request(parts.method, url)
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            error!(upstream = %target.role(), error = %e, "Upstream request failed");
            AppError::Upstream(e)
        })?;

    relay_response(response)
}

/// Copies status and headers and streams the body through untouched.
fn relay_response(response: reqwest::Response) -> Result<Response<Body>, AppError> {
    let mut builder = Response::builder().status(response.status());
    if let Some(headers) = builder.headers_mut() {
        headers.extend(response.headers().clone());
    }

    let stream = response.bytes_stream().map(|chunk| {
        if let Err(e) = &chunk {
            error!("Upstream stream error: {}", e);
        }
        chunk
    });

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Body(axum::Error::new(e)))
}
