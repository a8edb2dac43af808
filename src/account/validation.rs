//! Input validation for account creation

use crate::cpf::Cpf;
use crate::error::BankError;

use super::models::NewAccountRequest;

pub const SECRET_MIN_LEN: usize = 8;
pub const SECRET_MAX_LEN: usize = 16;

/// Validate a creation request in two passes.
///
/// The first pass reports missing fields (and a negative balance) together.
/// Only when every field is present are the CPF checksum and the secret
/// length checked, again reporting all violations at once.
pub fn validate_new_account(req: &NewAccountRequest) -> Result<Cpf, BankError> {
    let mut invalid = Vec::new();

    if req.secret.is_empty() {
        invalid.push("secret");
    }
    if req.cpf.is_empty() {
        invalid.push("cpf");
    }
    if req.name.trim().is_empty() {
        invalid.push("name");
    }
    if req.balance < 0 {
        invalid.push("balance");
    }
    if !invalid.is_empty() {
        return Err(BankError::invalid_fields(&invalid));
    }

    let mut problems = Vec::new();

    let cpf = match Cpf::parse(&req.cpf) {
        Ok(cpf) => Some(cpf),
        Err(e) => {
            problems.push(e.to_string());
            None
        }
    };

    let secret_len = req.secret.chars().count();
    if !(SECRET_MIN_LEN..=SECRET_MAX_LEN).contains(&secret_len) {
        problems.push(format!(
            "secret must be between {} and {} characters",
            SECRET_MIN_LEN, SECRET_MAX_LEN
        ));
    }

    match cpf {
        Some(cpf) if problems.is_empty() => Ok(cpf),
        _ => Err(BankError::Argument(problems.join(", "))),
    }
}
