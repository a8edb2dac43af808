//! In-process store
//!
//! Used when no PostgreSQL url is configured, and as the test double for the
//! services. A single mutex plays the role of the database's row locks: every
//! unit of work runs while holding it, so concurrent transfers serialize.
//! A transfer stages its changes on copies of the two accounts and writes
//! them back only after every step succeeded.

use std::collections::BTreeMap;
use std::sync::Mutex;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::account::{
    Account, AccountId, AccountRepository, AccountSummary, ListAccountQuery, ListAccountsResponse,
    NewAccount,
};
use crate::auth::CredentialStore;
use crate::error::BankError;
use crate::transfer::store::{DESTINATION_OVERFLOW, NOT_ENOUGH_FUNDS, account_not_found};
use crate::transfer::{
    LedgerStore, ListTransferQuery, ListTransferResponse, NewTransfer, TransferRecord,
    TransferView,
};

#[derive(Default)]
struct Ledger {
    accounts: BTreeMap<AccountId, Account>,
    transfers: Vec<TransferRecord>,
    next_account_id: AccountId,
    next_transfer_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    ledger: Mutex<Ledger>,
    #[cfg(test)]
    /// Store calls made, for asserting that rejected requests never got here
    calls: AtomicUsize,
    #[cfg(test)]
    /// Fail the next credit step after the debit has been staged
    fail_next_credit: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of an account
    pub fn account(&self, id: AccountId) -> Option<Account> {
        self.lock().ok()?.accounts.get(&id).cloned()
    }

    /// Snapshot of all committed transfer records
    pub fn transfers(&self) -> Vec<TransferRecord> {
        self.lock()
            .map(|ledger| ledger.transfers.clone())
            .unwrap_or_default()
    }

    pub fn set_active(&self, id: AccountId, active: bool) -> Result<(), BankError> {
        let mut ledger = self.lock()?;
        let account = ledger
            .accounts
            .get_mut(&id)
            .ok_or_else(|| account_not_found(id))?;
        account.active = active;
        account.updated_at = Utc::now();
        Ok(())
    }

    /// Make the next transfer fail between debit and credit, simulating a
    /// storage fault in the middle of the unit of work.
    #[cfg(test)]
    pub fn fail_next_credit(&self) {
        self.fail_next_credit.store(true, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn track(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    #[cfg(not(test))]
    fn track(&self) {}

    #[cfg(test)]
    fn take_credit_fault(&self) -> bool {
        self.fail_next_credit.swap(false, Ordering::SeqCst)
    }

    #[cfg(not(test))]
    fn take_credit_fault(&self) -> bool {
        false
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Ledger>, BankError> {
        self.ledger
            .lock()
            .map_err(|_| BankError::database("ledger lock poisoned"))
    }
}

fn page_number(page: i64) -> i64 {
    page + 1
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn add_account(&self, account: NewAccount) -> Result<AccountId, BankError> {
        self.track();
        let mut ledger = self.lock()?;

        if ledger.accounts.values().any(|a| a.cpf == account.cpf) {
            return Err(BankError::argument("cpf already registered"));
        }

        ledger.next_account_id += 1;
        let id = ledger.next_account_id;
        let now = Utc::now();
        ledger.accounts.insert(
            id,
            Account {
                id,
                name: account.name,
                cpf: account.cpf,
                balance: account.balance,
                secret_hash: account.secret_hash,
                active: true,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn list_accounts(
        &self,
        query: ListAccountQuery,
    ) -> Result<ListAccountsResponse, BankError> {
        self.track();
        let ledger = self.lock()?;

        let data = ledger
            .accounts
            .values()
            .skip(query.offset().max(0) as usize)
            .take(query.page_size.max(0) as usize)
            .map(|a| AccountSummary {
                id: a.id,
                name: a.name.clone(),
                cpf: a.cpf.clone(),
                balance: a.balance,
            })
            .collect();

        Ok(ListAccountsResponse {
            total: ledger.accounts.len() as i64,
            page: page_number(query.page),
            data,
        })
    }

    async fn get_account_balance(&self, id: AccountId) -> Result<i64, BankError> {
        self.track();
        self.lock()?
            .accounts
            .get(&id)
            .map(|a| a.balance)
            .ok_or_else(|| account_not_found(id))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get_account_by_cpf(&self, cpf: &str) -> Result<Account, BankError> {
        self.track();
        self.lock()?
            .accounts
            .values()
            .find(|a| a.cpf == cpf)
            .cloned()
            .ok_or_else(|| BankError::not_found("no account with this cpf"))
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_account_balance(&self, id: AccountId) -> Result<i64, BankError> {
        AccountRepository::get_account_balance(self, id).await
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, BankError> {
        self.track();
        self.lock()?
            .accounts
            .get(&id)
            .cloned()
            .ok_or_else(|| account_not_found(id))
    }

    async fn add_transfer(&self, t: &NewTransfer) -> Result<TransferRecord, BankError> {
        self.track();
        let mut ledger = self.lock()?;

        let mut origin = ledger
            .accounts
            .get(&t.origin)
            .cloned()
            .ok_or_else(|| account_not_found(t.origin))?;
        let mut destination = ledger
            .accounts
            .get(&t.destination)
            .cloned()
            .ok_or_else(|| account_not_found(t.destination))?;

        let now = Utc::now();
        let record = TransferRecord {
            id: ledger.next_transfer_id + 1,
            origin: t.origin,
            destination: t.destination,
            amount: t.amount,
            created_at: now,
        };

        // Debit, re-checked under the lock
        if origin.balance < t.amount {
            return Err(BankError::transfer(NOT_ENOUGH_FUNDS));
        }
        origin.balance -= t.amount;
        origin.updated_at = now;

        if self.take_credit_fault() {
            return Err(BankError::database("failed to credit destination account"));
        }

        destination.balance = destination
            .balance
            .checked_add(t.amount)
            .ok_or_else(|| BankError::transfer(DESTINATION_OVERFLOW))?;
        destination.updated_at = now;

        // Commit
        ledger.next_transfer_id = record.id;
        ledger.transfers.push(record.clone());
        ledger.accounts.insert(origin.id, origin);
        ledger.accounts.insert(destination.id, destination);

        Ok(record)
    }

    async fn get_transfers(
        &self,
        account_id: AccountId,
        query: ListTransferQuery,
    ) -> Result<ListTransferResponse, BankError> {
        self.track();
        let ledger = self.lock()?;

        let matching: Vec<&TransferRecord> = ledger
            .transfers
            .iter()
            .filter(|r| r.origin == account_id || r.destination == account_id)
            .collect();

        let mut data = Vec::new();
        for record in matching
            .iter()
            .skip(query.offset().max(0) as usize)
            .take(query.page_size.max(0) as usize)
        {
            let origin = ledger
                .accounts
                .get(&record.origin)
                .ok_or_else(|| BankError::database("transfer references unknown account"))?;
            let destination = ledger
                .accounts
                .get(&record.destination)
                .ok_or_else(|| BankError::database("transfer references unknown account"))?;
            data.push(TransferView {
                amount: record.amount as u64,
                created_at: record.created_at,
                destination_name: destination.name.clone(),
                destination_cpf: destination.cpf.clone(),
                origin_name: origin.name.clone(),
                origin_cpf: origin.cpf.clone(),
            });
        }

        Ok(ListTransferResponse {
            total: matching.len() as i64,
            page: page_number(query.page),
            data,
        })
    }
}
