use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;

use super::{Session, SessionRegistry, SessionToken};
use crate::http::{error_response, kind};

/// Authenticated caller resolved from the `Authorization: Bearer` header.
///
/// Requires an `Extension<Arc<SessionRegistry>>` layer on the router.
#[derive(Debug, Clone)]
pub struct Caller {
    pub token: SessionToken,
    pub session: Session,
}

pub fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(SessionToken(token.to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let registry = parts
            .extensions
            .get::<Arc<SessionRegistry>>()
            .cloned()
            .ok_or_else(|| {
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    kind::INTERNAL,
                    "session registry not configured",
                )
            })?;

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            error_response(
                StatusCode::UNAUTHORIZED,
                kind::UNAUTHENTICATED,
                "missing bearer token",
            )
        })?;

        match registry.resolve(&token) {
            Some(session) => Ok(Caller { token, session }),
            None => Err(error_response(
                StatusCode::UNAUTHORIZED,
                kind::UNAUTHENTICATED,
                "session expired or unknown",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert!(bearer_token(&headers).is_none());

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(
            bearer_token(&headers),
            Some(SessionToken("abc123".to_string()))
        );
    }
}
