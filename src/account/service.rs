use std::sync::Arc;
use std::time::Duration;

use super::models::{
    AccountId, BalanceResponse, ListAccountQuery, ListAccountsResponse, NewAccount,
    NewAccountRequest,
};
use super::repository::AccountRepository;
use super::validation::validate_new_account;
use crate::auth::password::hash_secret;
use crate::deadline::run_within;
use crate::error::BankError;

pub struct AccountService {
    repo: Arc<dyn AccountRepository>,
    timeout: Duration,
}

impl AccountService {
    pub fn new(repo: Arc<dyn AccountRepository>, timeout: Duration) -> Self {
        Self { repo, timeout }
    }

    /// Validate, hash the secret and persist a new active account.
    pub async fn new_account(&self, req: NewAccountRequest) -> Result<AccountId, BankError> {
        let cpf = validate_new_account(&req)?;
        let secret_hash = hash_secret(&req.secret)?;

        let account = NewAccount {
            name: req.name.trim().to_string(),
            cpf: cpf.to_string(),
            secret_hash,
            balance: req.balance,
        };

        let id = run_within(self.timeout, self.repo.add_account(account)).await?;
        tracing::info!(account_id = id, balance = req.balance, "account created");
        Ok(id)
    }

    pub async fn list(&self, query: ListAccountQuery) -> Result<ListAccountsResponse, BankError> {
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

        run_within(self.timeout, self.repo.list_accounts(query)).await
    }

    pub async fn get_balance(&self, id: AccountId) -> Result<BalanceResponse, BankError> {
        let balance = run_within(self.timeout, self.repo.get_account_balance(id)).await?;
        Ok(BalanceResponse { balance })
    }
}
