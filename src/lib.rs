//! Banking API
//!
//! Accounts, login and money transfers over HTTP.
//!
//! # Modules
//!
//! - [`account`] - Account creation, listing and balances
//! - [`auth`] - Secret hashing, JWT issue/verify, bearer middleware
//! - [`transfer`] - Transfer validation, engine and ledger store contract
//! - [`store`] - PostgreSQL and in-memory ledger stores
//! - [`gateway`] - axum router, handlers and OpenAPI docs
//! - [`config`] / [`logging`] - Startup configuration and tracing setup

pub mod account;
pub mod auth;
pub mod config;
pub mod cpf;
pub mod db;
pub mod deadline;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod store;
pub mod transfer;

pub use error::BankError;
pub use gateway::{build_router, run_server};
pub use transfer::{TransferEngine, TransferRequest};
