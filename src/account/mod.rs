//! Account management
//!
//! Creation (with CPF and secret validation), paginated listing and balance
//! lookups. Balances are only mutated here at creation time; afterwards the
//! transfer engine owns them.

pub mod models;
pub mod repository;
pub mod service;
pub mod validation;

pub use models::{
    Account, AccountId, AccountSummary, BalanceResponse, ListAccountQuery, ListAccountsResponse,
    NewAccount, NewAccountRequest,
};
pub use repository::AccountRepository;
pub use service::AccountService;
