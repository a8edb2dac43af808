use std::sync::Arc;

use crate::account::{AccountRepository, AccountService};
use crate::auth::{AuthService, CredentialStore};
use crate::config::AppConfig;
use crate::db::Database;
use crate::transfer::{LedgerStore, TransferConfig, TransferEngine};

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub auth: Arc<AuthService>,
    pub transfers: Arc<TransferEngine>,
    /// Present when backed by PostgreSQL; pinged by the health check
    pub db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        accounts: Arc<AccountService>,
        auth: Arc<AuthService>,
        transfers: Arc<TransferEngine>,
    ) -> Self {
        Self {
            accounts,
            auth,
            transfers,
            db: None,
        }
    }

    /// Wire every service to one store.
    pub fn from_store<S>(store: Arc<S>, config: &AppConfig) -> Self
    where
        S: AccountRepository + CredentialStore + LedgerStore + 'static,
    {
        let timeout = config.request_timeout();
        let accounts = AccountService::new(store.clone(), timeout);
        let auth = AuthService::new(
            store.clone(),
            config.auth.jwt_secret.clone(),
            config.token_ttl(),
            timeout,
        );
        let transfers = TransferEngine::new(
            store,
            TransferConfig {
                request_timeout: timeout,
            },
        );
        Self::new(Arc::new(accounts), Arc::new(auth), Arc::new(transfers))
    }

    pub fn with_database(mut self, db: Arc<Database>) -> Self {
        self.db = Some(db);
        self
    }
}
