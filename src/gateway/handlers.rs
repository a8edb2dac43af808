//! HTTP handlers
//!
//! Handlers only translate between the wire and the services; every error
//! leaves as a [`crate::error::BankError`] response.

mod account;
mod auth;
mod health;
mod transfer;

pub use account::{__path_create_account, create_account};
pub use account::{__path_get_account_balance, get_account_balance};
pub use account::{__path_get_own_balance, get_own_balance};
pub use account::{__path_list_accounts, list_accounts};
pub use auth::{__path_login, login};
pub use health::{__path_health_check, health_check};
pub use transfer::{__path_create_transfer, create_transfer};
pub use transfer::{__path_list_transfers, list_transfers};
