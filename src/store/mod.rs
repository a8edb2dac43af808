//! Store implementations
//!
//! Both stores implement every capability trait the services depend on:
//! [`crate::account::AccountRepository`], [`crate::auth::CredentialStore`]
//! and [`crate::transfer::LedgerStore`].

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;
