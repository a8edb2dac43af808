//! Boundary DTOs and request extraction helpers

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::BankError;

pub const DEFAULT_PAGE_SIZE: i64 = 15;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = true)]
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MsgResponse {
    #[schema(example = "account created")]
    pub msg: String,
}

impl MsgResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// Raw paging query. Values stay strings so that bad input is reported
/// by name instead of as a generic rejection.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-indexed page, default 1
    pub page: Option<String>,
    /// Items per page (1..=100), default 15
    pub page_size: Option<String>,
}

impl PageParams {
    /// Parse into `(page_size, page)` with the page converted to 0-indexed.
    pub fn resolve(&self) -> Result<(i64, i64), BankError> {
        let mut invalid = Vec::new();

        let page_size = match self.page_size.as_deref() {
            None | Some("") => Some(DEFAULT_PAGE_SIZE),
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|n| (1..=MAX_PAGE_SIZE).contains(n)),
        };
        if page_size.is_none() {
            invalid.push("pageSize");
        }

        let page = match self.page.as_deref() {
            None | Some("") => Some(1),
            Some(raw) => raw.parse::<i64>().ok().filter(|n| *n >= 1),
        }
        // The row offset must stay representable
        .filter(|p| {
            (p - 1)
                .checked_mul(page_size.unwrap_or(MAX_PAGE_SIZE))
                .is_some()
        });
        if page.is_none() {
            invalid.push("page");
        }

        match (page_size, page) {
            (Some(size), Some(page)) => Ok((size, page - 1)),
            _ => Err(BankError::invalid_fields(&invalid)),
        }
    }
}

/// `Json` extractor whose rejection uses the `{"error": ...}` body
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BankError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

/// `Query` extractor whose rejection uses the `{"error": ...}` body
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BankError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(ApiQuery(value)),
            Err(rejection) => Err(BankError::argument(format!(
                "malformed query string: {}",
                rejection.body_text()
            ))),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> BankError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            BankError::argument("expected application/json body")
        }
        other => BankError::argument(format!("malformed JSON body: {}", other.body_text())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<&str>, page_size: Option<&str>) -> PageParams {
        PageParams {
            page: page.map(String::from),
            page_size: page_size.map(String::from),
        }
    }

    #[test]
    fn test_defaults() {
        assert_eq!(PageParams::default().resolve(), Ok((15, 0)));
    }

    #[test]
    fn test_page_is_converted_to_zero_indexed() {
        assert_eq!(params(Some("3"), Some("20")).resolve(), Ok((20, 2)));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(params(None, Some("100")).resolve(), Ok((100, 0)));
        assert_eq!(
            params(None, Some("101")).resolve(),
            Err(BankError::argument("pageSize"))
        );
        assert_eq!(
            params(Some("0"), Some("0")).resolve(),
            Err(BankError::argument("pageSize, page"))
        );
    }

    #[test]
    fn test_page_beyond_offset_range() {
        let huge = i64::MAX.to_string();
        assert_eq!(
            params(Some(&huge), Some("100")).resolve(),
            Err(BankError::argument("page"))
        );
        // Largest page whose offset still fits
        let last = (i64::MAX / 100 + 1).to_string();
        assert_eq!(
            params(Some(&last), Some("100")).resolve(),
            Ok((100, i64::MAX / 100))
        );
    }

    #[test]
    fn test_non_numeric() {
        assert_eq!(
            params(Some("two"), None).resolve(),
            Err(BankError::argument("page"))
        );
    }
}
