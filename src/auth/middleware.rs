use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::error::BankError;
use crate::gateway::state::AppState;

const BEARER_SCHEMA: &str = "Bearer ";

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, BankError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| BankError::unauthorized("missing authorization header"))?;

    match auth_header.strip_prefix(BEARER_SCHEMA) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(BankError::unauthorized("invalid authentication token")),
    }
}

/// Reject unauthenticated requests and inject the caller's account id.
pub async fn jwt_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, BankError> {
    let token = bearer_token(request.headers())?;
    let caller = state.auth.verify_token(token)?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}
