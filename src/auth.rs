//! Bearer-credential extraction.
//!
//! The caller's identity is never taken from the request body or any
//! client-supplied field — only the `Authorization` header is trusted, and
//! resolution against the auth backend happens before any entries query.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::SparkError;

/// Raw bearer credential lifted from the `Authorization` header.
///
/// Holding this type proves a credential was *present*; it does not prove it
/// is valid. [`crate::repository::EntriesRepository::resolve_caller`] does that.
pub struct BearerToken(pub String);

/// Parse `Bearer <token>` out of an Authorization header value.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let rest = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?;
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = SparkError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(SparkError::Unauthenticated)?;
        let token = parse_bearer(header).ok_or(SparkError::Unauthenticated)?;
        Ok(BearerToken(token.to_string()))
    }
}
