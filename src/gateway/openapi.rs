//! OpenAPI / Swagger UI documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::{
    AccountSummary, BalanceResponse, ListAccountsResponse, NewAccountRequest,
};
use crate::auth::{LoginRequest, LoginResponse};
use crate::error::ErrorResponse;
use crate::gateway::types::{HealthResponse, MsgResponse};
use crate::transfer::{ListTransferResponse, TransferRequest, TransferView};

/// JWT bearer scheme issued by `POST /login`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /login: Bearer <token>"))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Banking API",
        version = "1.0.0",
        description = "Accounts, login and money transfers. Amounts are integers in the smallest currency unit."
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::login,
        crate::gateway::handlers::create_account,
        crate::gateway::handlers::list_accounts,
        crate::gateway::handlers::get_own_balance,
        crate::gateway::handlers::get_account_balance,
        crate::gateway::handlers::create_transfer,
        crate::gateway::handlers::list_transfers,
    ),
    components(
        schemas(
            HealthResponse,
            MsgResponse,
            ErrorResponse,
            LoginRequest,
            LoginResponse,
            NewAccountRequest,
            AccountSummary,
            ListAccountsResponse,
            BalanceResponse,
            TransferRequest,
            TransferView,
            ListTransferResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Accounts", description = "Account creation, listing and balances"),
        (name = "Auth", description = "Login"),
        (name = "Transfers", description = "Money transfers between accounts (auth required)"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "Banking API");
        assert_eq!(spec.info.version, "1.0.0");
    }

    #[test]
    fn test_endpoints_registered() {
        let paths = ApiDoc::openapi().paths.paths;
        for path in [
            "/",
            "/login",
            "/accounts",
            "/accounts/balance",
            "/accounts/{id}/balance",
            "/transfers",
        ] {
            assert!(paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_security_scheme_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("should have components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_openapi_json_serializable() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("transferDate"));
    }
}
