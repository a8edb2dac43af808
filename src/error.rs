//! Error taxonomy shared by every service.
//!
//! Each variant carries a context string and renders as `"<prefix>: <context>"`.
//! The HTTP layer maps variants to status codes through a fixed table
//! ([`BankError::http_status`]).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

pub const ARGUMENT_ERROR_PREFIX: &str = "invalid argument";
pub const TRANSFER_ERROR_PREFIX: &str = "transfer error";
pub const DB_ERROR_PREFIX: &str = "database error";
pub const AUTH_ERROR_PREFIX: &str = "authentication error";
pub const INTERNAL_ERROR_PREFIX: &str = "internal error";
pub const CONFIG_ERROR_PREFIX: &str = "configuration error";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    /// Malformed or missing request fields
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Business-rule rejection of a transfer
    #[error("transfer error: {0}")]
    TransferRequest(String),

    /// Raised by stores when an account id does not exist
    #[error("database error: {0}")]
    AccountNotFound(String),

    /// Store or infrastructure failure. The context never contains query text.
    #[error("database error: {0}")]
    Database(String),

    #[error("authentication error: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("request timeout")]
    Timeout,
}

impl BankError {
    pub fn argument(context: impl Into<String>) -> Self {
        Self::Argument(context.into())
    }

    pub fn transfer(context: impl Into<String>) -> Self {
        Self::TransferRequest(context.into())
    }

    pub fn not_found(context: impl Into<String>) -> Self {
        Self::AccountNotFound(context.into())
    }

    pub fn database(context: impl Into<String>) -> Self {
        Self::Database(context.into())
    }

    pub fn unauthorized(context: impl Into<String>) -> Self {
        Self::Unauthorized(context.into())
    }

    pub fn internal(context: impl Into<String>) -> Self {
        Self::Internal(context.into())
    }

    /// Build an argument error from a list of offending field names.
    pub fn invalid_fields(fields: &[&str]) -> Self {
        Self::Argument(fields.join(", "))
    }

    /// Machine-readable variant name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            BankError::Argument(_) => "ARGUMENT",
            BankError::TransferRequest(_) => "TRANSFER_REQUEST",
            BankError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            BankError::Database(_) => "DATABASE",
            BankError::Unauthorized(_) => "UNAUTHORIZED",
            BankError::Internal(_) => "INTERNAL",
            BankError::Timeout => "TIMEOUT",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            BankError::Argument(_) | BankError::TransferRequest(_) => StatusCode::BAD_REQUEST,
            BankError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            BankError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            BankError::Timeout => StatusCode::REQUEST_TIMEOUT,
            BankError::Database(_) | BankError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Returns a mapper that logs the driver error and hides it behind a generic context.
pub fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> BankError {
    move |e| {
        tracing::error!(error = %e, "{}", context);
        BankError::Database(context.to_string())
    }
}

/// Startup configuration problems
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("configuration error: missing or invalid values: {0}")]
    Invalid(String),
}

/// JSON error body: `{"error": "<prefix>: <context>"}`
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "transfer error: not enough funds")]
    pub error: String,
}

impl IntoResponse for BankError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "request failed: {}", self);
        } else {
            tracing::debug!(kind = self.kind(), "request rejected: {}", self);
        }
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            BankError::argument("amount, destination").to_string(),
            "invalid argument: amount, destination"
        );
        assert_eq!(
            BankError::transfer("not enough funds").to_string(),
            "transfer error: not enough funds"
        );
        assert_eq!(
            BankError::database("failed to read balance").to_string(),
            "database error: failed to read balance"
        );
        assert_eq!(BankError::Timeout.to_string(), "request timeout");
    }

    #[test]
    fn test_prefix_constants_match_display() {
        assert!(
            BankError::argument("x")
                .to_string()
                .starts_with(ARGUMENT_ERROR_PREFIX)
        );
        assert!(
            BankError::transfer("x")
                .to_string()
                .starts_with(TRANSFER_ERROR_PREFIX)
        );
        assert!(
            BankError::not_found("x")
                .to_string()
                .starts_with(DB_ERROR_PREFIX)
        );
        assert!(
            BankError::unauthorized("x")
                .to_string()
                .starts_with(AUTH_ERROR_PREFIX)
        );
        assert!(
            BankError::internal("x")
                .to_string()
                .starts_with(INTERNAL_ERROR_PREFIX)
        );
        assert!(
            ConfigError::Invalid("x".into())
                .to_string()
                .starts_with(CONFIG_ERROR_PREFIX)
        );
    }

    #[test]
    fn test_http_status_table() {
        assert_eq!(BankError::argument("x").http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(BankError::transfer("x").http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            BankError::unauthorized("x").http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(BankError::not_found("x").http_status(), StatusCode::NOT_FOUND);
        assert_eq!(BankError::Timeout.http_status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            BankError::database("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            BankError::internal("x").http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_fields_joined() {
        let err = BankError::invalid_fields(&["amount", "destination"]);
        assert_eq!(err, BankError::Argument("amount, destination".into()));
    }

    #[test]
    fn test_db_error_hides_driver_message() {
        let err = db_error("failed to read balance")(sqlx::Error::RowNotFound);
        assert_eq!(err, BankError::Database("failed to read balance".into()));
    }
}
