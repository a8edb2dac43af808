//! Transfer Engine
//!
//! Authorizes and executes validated transfers against a [`LedgerStore`] and
//! serves transfer history. Stateless: every call is an independent unit of
//! work and all serialization is left to the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::store::{LedgerStore, NOT_ENOUGH_FUNDS, account_not_found};
use super::types::{ListTransferQuery, ListTransferResponse, NewTransfer, TransferRequest};
use super::validation::validate_transfer;
use crate::account::AccountId;
use crate::deadline::{run_until, run_within};
use crate::error::BankError;

/// Engine settings, injected once at startup
#[derive(Debug, Clone, Copy)]
pub struct TransferConfig {
    /// Deadline applied to each call when the caller supplies none
    pub request_timeout: Duration,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
        }
    }
}

pub struct TransferEngine {
    store: Arc<dyn LedgerStore>,
    config: TransferConfig,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn LedgerStore>, config: TransferConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Validate and execute a transfer within the configured timeout.
    pub async fn do_transfer(&self, req: TransferRequest) -> Result<(), BankError> {
        self.do_transfer_until(Instant::now() + self.config.request_timeout, req)
            .await
    }

    /// Validate and execute a transfer, abandoning it at `deadline`.
    ///
    /// Validation runs first and never touches the store. If the deadline
    /// fires mid-commit the store future is dropped and its unit of work
    /// rolls back; the caller sees [`BankError::Timeout`].
    pub async fn do_transfer_until(
        &self,
        deadline: Instant,
        req: TransferRequest,
    ) -> Result<(), BankError> {
        let transfer = validate_transfer(&req)?;
        run_until(deadline, self.execute(transfer)).await
    }

    async fn execute(&self, t: NewTransfer) -> Result<(), BankError> {
        let origin_balance = self
            .store
            .get_account_balance(t.origin)
            .await
            .map_err(|e| match e {
                BankError::AccountNotFound(_) => BankError::transfer("origin account not found"),
                other => other,
            })?;

        // Cheapest and most common rejection, checked before the destination
        if origin_balance < t.amount {
            debug!(
                origin = t.origin,
                balance = origin_balance,
                amount = t.amount,
                "transfer rejected: insufficient funds"
            );
            return Err(BankError::transfer(NOT_ENOUGH_FUNDS));
        }

        let destination = self
            .store
            .get_account_by_id(t.destination)
            .await
            .map_err(destination_error)?;

        if !destination.active {
            return Err(BankError::transfer("destination account is inactive"));
        }

        let record = self
            .store
            .add_transfer(&t)
            .await
            .map_err(|e| commit_error(e, t.origin))
            .inspect_err(|e| {
                warn!(
                    origin = t.origin,
                    destination = t.destination,
                    amount = t.amount,
                    kind = e.kind(),
                    "transfer not committed: {}",
                    e
                )
            })?;

        info!(
            transfer_id = record.id,
            origin = t.origin,
            destination = t.destination,
            amount = t.amount,
            "transfer committed"
        );
        Ok(())
    }

    /// Transfers where `account_id` is origin or destination, oldest first.
    pub async fn get_transfers(
        &self,
        account_id: AccountId,
        query: ListTransferQuery,
    ) -> Result<ListTransferResponse, BankError> {
        let mut invalid = Vec::new();
        if query.page_size < 1 {
            invalid.push("pageSize");
        }
        if query.page < 0 || query.checked_offset().is_none() {
            invalid.push("page");
        }
        if !invalid.is_empty() {
            return Err(BankError::invalid_fields(&invalid));
        }

        run_within(
            self.config.request_timeout,
            self.store.get_transfers(account_id, query),
        )
        .await
    }
}

/// The store's not-found signal never leaves the engine raw.
fn destination_error(e: BankError) -> BankError {
    match e {
        BankError::AccountNotFound(ctx) => {
            BankError::TransferRequest(format!("destination account not found: {}", ctx))
        }
        other => other,
    }
}

/// The origin may vanish between the balance read and the commit.
fn commit_error(e: BankError, origin: AccountId) -> BankError {
    if e == account_not_found(origin) {
        BankError::transfer("origin account not found")
    } else {
        destination_error(e)
    }
}
