//! Transfer handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::auth::AuthenticatedAccount;
use crate::error::{BankError, ErrorResponse};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiJson, ApiQuery, PageParams};
use crate::transfer::{ListTransferQuery, ListTransferResponse, TransferRequest};

/// Transfer from the authenticated account
///
/// The origin is always the caller; an `origin` field in the body is ignored.
#[utoipa::path(
    post,
    path = "/transfers",
    request_body = TransferRequest,
    responses(
        (status = 201, description = "Transfer committed; echoes the request", body = TransferRequest),
        (status = 400, description = "Invalid fields or transfer rejected", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 408, description = "Request timeout", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    ApiJson(mut req): ApiJson<TransferRequest>,
) -> Result<(StatusCode, Json<TransferRequest>), BankError> {
    req.origin = caller.account_id;
    state.transfers.do_transfer(req.clone()).await?;
    Ok((StatusCode::CREATED, Json(req)))
}

/// Transfers sent or received by the authenticated account, oldest first
#[utoipa::path(
    get,
    path = "/transfers",
    params(PageParams),
    responses(
        (status = 200, description = "Page of transfers", body = ListTransferResponse),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Transfers"
)]
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedAccount>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<ListTransferResponse>, BankError> {
    let (page_size, page) = params.resolve()?;
    state
        .transfers
        .get_transfers(caller.account_id, ListTransferQuery { page_size, page })
        .await
        .map(Json)
}
