//! Storage contract for account management

use async_trait::async_trait;

use super::models::{AccountId, ListAccountQuery, ListAccountsResponse, NewAccount};
use crate::error::BankError;

/// Account persistence used by [`super::AccountService`].
///
/// Implemented by the PostgreSQL store and the in-memory store.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new active account and return its id.
    ///
    /// A duplicate CPF is reported as [`BankError::Argument`].
    async fn add_account(&self, account: NewAccount) -> Result<AccountId, BankError>;

    /// Page of accounts ordered by id, plus the total count.
    async fn list_accounts(&self, query: ListAccountQuery)
    -> Result<ListAccountsResponse, BankError>;

    /// Fails with [`BankError::AccountNotFound`] for unknown ids.
    async fn get_account_balance(&self, id: AccountId) -> Result<i64, BankError>;
}
