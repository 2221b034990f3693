//! Bearer token authentication.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Reject requests whose bearer token does not match the shared secret.
///
/// Runs before the handler, so an unauthenticated body is never parsed and
/// no model call is made.
pub async fn require_bearer(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    match check_bearer(&headers, state.auth_token()) {
        Ok(()) => next.run(request).await,
        Err(err) => {
            tracing::warn!(path = %request.uri().path(), "{}", err);
            err.into_response()
        }
    }
}

fn check_bearer(headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .ok_or(ApiError::Unauthorized("Missing or invalid token"))?;

    if !tokens_match(token.as_bytes(), expected.as_bytes()) {
        return Err(ApiError::Unauthorized("Invalid token"));
    }

    Ok(())
}

/// Compare without an early exit, so timing does not reveal the matching prefix.
fn tokens_match(given: &[u8], expected: &[u8]) -> bool {
    given.len() == expected.len()
        && given
            .iter()
            .zip(expected)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}
