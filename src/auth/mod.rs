pub mod identity;
pub mod middleware;

use axum::http::HeaderMap;

/// Pull the identity token from request headers.
///
/// The web client sends it in `authtoken`; `Authorization: Bearer` is
/// accepted as well.
#[must_use]
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authtoken")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .map(str::trim)
                .filter(|t| !t.is_empty())
        })
}
