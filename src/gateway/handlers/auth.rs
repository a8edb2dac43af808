use std::sync::Arc;

use axum::{Json, extract::State};

use crate::auth::{LoginRequest, LoginResponse};
use crate::error::{BankError, ErrorResponse};
use crate::gateway::state::AppState;
use crate::gateway::types::ApiJson;

/// Exchange CPF and secret for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Missing or malformed credentials", body = ErrorResponse),
        (status = 401, description = "Invalid credentials or inactive account", body = ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, BankError> {
    state.auth.login(req).await.map(Json)
}
