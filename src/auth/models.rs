//! Authentication data types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::account::AccountId;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // account id as string
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "529.982.247-25")]
    pub cpf: String,
    #[serde(default)]
    #[schema(example = "s3cretpass")]
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// Caller identity injected by [`super::jwt_auth_middleware`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub account_id: AccountId,
}
