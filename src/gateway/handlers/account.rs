//! Account handlers

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::account::{
    AccountId, BalanceResponse, ListAccountQuery, ListAccountsResponse, NewAccountRequest,
};
use crate::auth::AuthenticatedAccount;
use crate::error::{BankError, ErrorResponse};
use crate::gateway::state::AppState;
use crate::gateway::types::{ApiJson, ApiQuery, MsgResponse, PageParams};

/// Open a new account
#[utoipa::path(
    post,
    path = "/accounts",
    request_body = NewAccountRequest,
    responses(
        (status = 201, description = "Account created", body = MsgResponse),
        (status = 400, description = "Invalid fields or CPF already registered", body = ErrorResponse)
    ),
    tag = "Accounts"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<NewAccountRequest>,
) -> Result<(StatusCode, Json<MsgResponse>), BankError> {
    state.accounts.new_account(req).await?;
    Ok((StatusCode::CREATED, Json(MsgResponse::new("account created"))))
}

/// Paginated account listing, ordered by id
#[utoipa::path(
    get,
    path = "/accounts",
    params(PageParams),
    responses(
        (status = 200, description = "Page of accounts", body = ListAccountsResponse),
        (status = 400, description = "Invalid paging parameters", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> Result<Json<ListAccountsResponse>, BankError> {
    let (page_size, page) = params.resolve()?;
    state
        .accounts
        .list(ListAccountQuery { page_size, page })
        .await
        .map(Json)
}

/// Balance of the authenticated account
#[utoipa::path(
    get,
    path = "/accounts/balance",
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn get_own_balance(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthenticatedAccount>,
) -> Result<Json<BalanceResponse>, BankError> {
    state.accounts.get_balance(caller.account_id).await.map(Json)
}

/// Balance of any account by id
#[utoipa::path(
    get,
    path = "/accounts/{id}/balance",
    params(("id" = u64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse),
        (status = 400, description = "Non-numeric id", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown account", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn get_account_balance(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<BalanceResponse>, BankError> {
    let id: AccountId = raw_id
        .parse()
        .map_err(|_| BankError::argument("invalid id format"))?;
    state.accounts.get_balance(id).await.map(Json)
}
