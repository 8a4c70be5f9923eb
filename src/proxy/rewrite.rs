use crate::{endpoint::UpstreamTarget, error::AppError};
use axum::http::Uri;

/// Re-roots `original` on `target`.
///
/// Scheme and authority come from the target; the path and query are taken
/// verbatim from the original request target, so percent-encoding, trailing
/// slashes, empty queries and parameter order are untouched. Any path or
/// query on the target base URL is ignored.
pub fn rewrite_url(original: &Uri, target: &UpstreamTarget) -> Result<Uri, AppError> {
    let path_and_query = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .filter(|pq| !pq.is_empty())
        .unwrap_or("/");

    let rewritten = format!("{}://{}{}", target.scheme(), target.authority(), path_and_query);
    rewritten
        .parse::<Uri>()
        .map_err(|e| AppError::InvalidUrl(format!("{}: {}", rewritten, e)))
}
