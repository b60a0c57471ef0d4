//! Bearer-token middleware for the protected routes.
//!
//! Requests without a usable `Authorization: Bearer <token>` header are rejected with 400,
//! requests whose token fails validation with 401. Accepted requests carry an
//! [`AuthenticatedUser`] extension for the handlers.

use super::{AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Identity attached to a request whose bearer token validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(pub i64);

/// Validates the bearer token and attaches [`AuthenticatedUser`] before running `next`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let verdict = extract_bearer_token(request.headers()).map(|token| state.auth.verify_token(token));

    match verdict {
        None => ApiError::bad_request().into_response(),
        Some(Err(err)) => ApiError::from(err).into_response(),
        Some(Ok(user_id)) => {
            request.extensions_mut().insert(AuthenticatedUser(user_id));
            next.run(request).await
        }
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static("")));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&headers_with("Bearer abc")), Some("abc"));
        assert_eq!(extract_bearer_token(&headers_with("Bearer  abc ")), Some("abc"));
        assert_eq!(extract_bearer_token(&headers_with("Bearer ")), None);
        assert_eq!(extract_bearer_token(&headers_with("Basic abc")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }
}
