//! Transfer data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::account::AccountId;

/// Transfer request as decoded at the boundary.
///
/// `origin` is never read from the body; it is the authenticated caller.
/// Fields are optional so that missing values can be reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransferRequest {
    #[serde(skip)]
    pub origin: AccountId,
    #[serde(default)]
    #[schema(example = 2)]
    pub destination: Option<AccountId>,
    /// Smallest currency unit
    #[serde(default)]
    #[schema(example = 300)]
    pub amount: Option<i64>,
}

impl TransferRequest {
    pub fn new(origin: AccountId, destination: AccountId, amount: i64) -> Self {
        Self {
            origin,
            destination: Some(destination),
            amount: Some(amount),
        }
    }
}

/// Structurally valid transfer: amount > 0, origin != destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTransfer {
    pub origin: AccountId,
    pub destination: AccountId,
    pub amount: i64,
}

/// Committed, immutable ledger entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub id: i64,
    pub origin: AccountId,
    pub destination: AccountId,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Zero-indexed page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListTransferQuery {
    pub page_size: i64,
    pub page: i64,
}

impl ListTransferQuery {
    /// Rows to skip, or `None` when the page lies beyond `i64` range
    pub fn checked_offset(&self) -> Option<i64> {
        self.page_size.checked_mul(self.page)
    }

    /// Saturating; callers validate with [`Self::checked_offset`] first.
    pub fn offset(&self) -> i64 {
        self.page_size.saturating_mul(self.page)
    }
}

/// Transfer projection joined with both parties' display fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferView {
    pub amount: u64,
    #[serde(rename = "transferDate")]
    pub created_at: DateTime<Utc>,
    pub destination_name: String,
    pub destination_cpf: String,
    pub origin_name: String,
    pub origin_cpf: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListTransferResponse {
    /// Matching records across all pages
    pub total: i64,
    /// 1-indexed page served
    pub page: i64,
    pub data: Vec<TransferView>,
}
