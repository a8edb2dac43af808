//! Ledger store contract required by the transfer engine

use async_trait::async_trait;

use super::types::{ListTransferQuery, ListTransferResponse, NewTransfer, TransferRecord};
use crate::account::{Account, AccountId};
use crate::error::BankError;

/// Transactional store holding balances and transfer records.
///
/// Implemented by [`crate::store::PgStore`] and [`crate::store::MemoryStore`].
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Fails with [`BankError::AccountNotFound`] for unknown ids.
    async fn get_account_balance(&self, id: AccountId) -> Result<i64, BankError>;

    /// Fails with [`BankError::AccountNotFound`] for unknown ids.
    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, BankError>;

    /// Apply one transfer as a single unit of work.
    ///
    /// Inserts the record, debits the origin and credits the destination.
    /// All three commit together or the unit of work is rolled back before
    /// the error is returned. Implementations must serialize concurrent units
    /// of work touching the same account and re-check funds while holding it:
    /// a debit that would leave the origin negative fails with
    /// [`BankError::TransferRequest`] `"not enough funds"`.
    async fn add_transfer(&self, transfer: &NewTransfer) -> Result<TransferRecord, BankError>;

    /// Page of transfers where the account is origin or destination,
    /// ordered by record id ascending.
    async fn get_transfers(
        &self,
        account_id: AccountId,
        query: ListTransferQuery,
    ) -> Result<ListTransferResponse, BankError>;
}

pub const NOT_ENOUGH_FUNDS: &str = "not enough funds";
pub const DESTINATION_OVERFLOW: &str = "destination balance would overflow";

/// Not-found signal for an account id. Stores report a missing row in a
/// transfer through this, so the engine can tell which side vanished.
pub fn account_not_found(id: AccountId) -> BankError {
    BankError::not_found(format!("account {} not found", id))
}
