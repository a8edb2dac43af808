//! Login and bearer-token authentication
//!
//! Secrets are hashed with argon2. Login issues an HS256 JWT whose `sub`
//! claim is the account id; the middleware verifies it and injects
//! [`AuthenticatedAccount`] into the request extensions.

pub mod middleware;
pub mod models;
pub mod password;
pub mod service;

pub use middleware::{bearer_token, jwt_auth_middleware};
pub use models::{AuthenticatedAccount, Claims, LoginRequest, LoginResponse};
pub use service::{AuthService, CredentialStore};
