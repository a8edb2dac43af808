//! Data models for account management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Numeric account id (BIGSERIAL in storage)
pub type AccountId = u64;

/// Stored account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub cpf: String,
    /// Smallest currency unit; never negative
    pub balance: i64,
    /// argon2 PHC string
    pub secret_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Account creation request body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NewAccountRequest {
    #[serde(default)]
    #[schema(example = "Maria Silva")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "529.982.247-25")]
    pub cpf: String,
    #[serde(default)]
    #[schema(example = "s3cretpass")]
    pub secret: String,
    #[serde(default)]
    #[schema(example = 100000)]
    pub balance: i64,
}

/// Validated account ready to be persisted. The secret is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub cpf: String,
    pub secret_hash: String,
    pub balance: i64,
}

/// Zero-indexed page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListAccountQuery {
    pub page_size: i64,
    pub page: i64,
}

impl ListAccountQuery {
    /// Rows to skip, or `None` when the page lies beyond `i64` range
    pub fn checked_offset(&self) -> Option<i64> {
        self.page_size.checked_mul(self.page)
    }

    /// Saturating; callers validate with [`Self::checked_offset`] first.
    pub fn offset(&self) -> i64 {
        self.page_size.saturating_mul(self.page)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountSummary {
    pub id: AccountId,
    pub name: String,
    pub cpf: String,
    pub balance: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListAccountsResponse {
    pub total: i64,
    /// 1-indexed page served
    pub page: i64,
    pub data: Vec<AccountSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    #[schema(example = 100000)]
    pub balance: i64,
}
