use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::models::{AuthenticatedAccount, Claims, LoginRequest, LoginResponse};
use super::password::verify_secret;
use crate::account::Account;
use crate::cpf::Cpf;
use crate::deadline::run_within;
use crate::error::BankError;

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Credential lookup used by login
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with [`BankError::AccountNotFound`] when no account has this CPF.
    async fn get_account_by_cpf(&self, cpf: &str) -> Result<Account, BankError>;
}

pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    jwt_secret: String,
    token_ttl: Duration,
    timeout: Duration,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        jwt_secret: String,
        token_ttl: Duration,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            jwt_secret,
            token_ttl,
            timeout,
        }
    }

    /// Verify CPF + secret and issue a token.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, BankError> {
        let cpf = validate_login(&req)?;

        let account = match run_within(self.timeout, self.store.get_account_by_cpf(cpf.as_str()))
            .await
        {
            Ok(account) => account,
            Err(BankError::AccountNotFound(_)) => {
                tracing::debug!("login attempt for unknown cpf");
                return Err(BankError::unauthorized(INVALID_CREDENTIALS));
            }
            Err(e) => return Err(e),
        };

        if !verify_secret(&req.secret, &account.secret_hash)? {
            tracing::warn!(account_id = account.id, "login failed: wrong secret");
            return Err(BankError::unauthorized(INVALID_CREDENTIALS));
        }

        if !account.active {
            return Err(BankError::unauthorized("this account is inactive"));
        }

        let token = self.issue_token(account.id)?;
        tracing::info!(account_id = account.id, "login succeeded");
        Ok(LoginResponse { token })
    }

    pub fn issue_token(&self, account_id: u64) -> Result<String, BankError> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: account_id.to_string(),
            exp: now + self.token_ttl.as_secs() as usize,
            iat: now,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| {
            tracing::error!(error = %e, "token signing failed");
            BankError::internal("failed to create account token")
        })
    }

    /// Check signature and expiry, then resolve the caller's account id.
    pub fn verify_token(&self, token: &str) -> Result<AuthenticatedAccount, BankError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| BankError::unauthorized("invalid authentication token"))?;

        let account_id = token_data
            .claims
            .sub
            .parse()
            .map_err(|_| BankError::unauthorized("invalid authentication token"))?;

        Ok(AuthenticatedAccount { account_id })
    }
}

fn validate_login(req: &LoginRequest) -> Result<Cpf, BankError> {
    let mut missing = Vec::new();
    if req.cpf.is_empty() {
        missing.push("CPF");
    }
    if req.secret.is_empty() {
        missing.push("Secret");
    }
    if !missing.is_empty() {
        return Err(BankError::Argument(format!(
            "missing values: {}",
            missing.join(", ")
        )));
    }

    Cpf::parse(&req.cpf).map_err(|e| BankError::Argument(format!("invalid CPF: {}", e)))
}
