//! Money transfer subsystem
//!
//! # Flow
//!
//! ```text
//! validate → read origin balance → funds check → destination lookup → commit
//! ```
//!
//! The commit is a single unit of work in the ledger store: insert the
//! transfer record, debit the origin, credit the destination. Either all three
//! apply or none do. The engine keeps no in-process locks; concurrent
//! transfers touching the same account are serialized by the store, which
//! re-checks funds while holding the account rows.

pub mod engine;
pub mod store;
pub mod types;
pub mod validation;

mod integration_tests;

pub use engine::{TransferConfig, TransferEngine};
pub use store::LedgerStore;
pub use types::{
    ListTransferQuery, ListTransferResponse, NewTransfer, TransferRecord, TransferRequest,
    TransferView,
};
pub use validation::validate_transfer;
