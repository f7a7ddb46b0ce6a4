use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use url::Url;

/// GET /:code
///
/// Records the visit and answers 302 Found (temporary, so browsers don't
/// cache the mapping). Unknown codes get 404 `{ "error": "Link not found" }`.
pub async fn redirect(State(state): State<Arc<AppState>>, Path(code): Path<String>) -> Response {
    let target = match state.resolver.resolve(&code).await {
        Ok(target) => target,
        Err(e) => return e.into_response(),
    };

    match location(&target) {
        Some(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        None => {
            tracing::error!("Target URL for '{}' is not a valid Location header", code);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────

/// The stored URL verbatim when it is plain ASCII and header-safe, otherwise
/// its percent-encoded / punycode serialization.
fn location(target: &str) -> Option<HeaderValue> {
    if target.is_ascii() {
        if let Ok(value) = HeaderValue::from_str(target) {
            return Some(value);
        }
    }
    Url::parse(target)
        .ok()
        .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
}
