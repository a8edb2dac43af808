//! CPF (Brazilian taxpayer id) validation
//!
//! Accepted format is `ddd.ddd.ddd-dd`. The last two digits are check digits
//! computed with the mod-11 weighting scheme.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CpfError {
    #[error("invalid CPF format or value")]
    InvalidFormat,

    #[error("invalid CPF")]
    InvalidCheckDigit,
}

/// Validated CPF, stored in its formatted `ddd.ddd.ddd-dd` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

impl Cpf {
    pub fn parse(raw: &str) -> Result<Self, CpfError> {
        let digits = parse_digits(raw)?;

        if check_digit(1, &digits[..9]) != digits[9] {
            return Err(CpfError::InvalidCheckDigit);
        }
        if check_digit(0, &digits[..10]) != digits[10] {
            return Err(CpfError::InvalidCheckDigit);
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks `ddd.ddd.ddd-dd` and extracts the 11 digits.
fn parse_digits(raw: &str) -> Result<[u8; 11], CpfError> {
    let bytes = raw.as_bytes();
    if bytes.len() != 14 {
        return Err(CpfError::InvalidFormat);
    }

    let mut digits = [0u8; 11];
    let mut n = 0;
    for (i, &b) in bytes.iter().enumerate() {
        match i {
            3 | 7 => {
                if b != b'.' {
                    return Err(CpfError::InvalidFormat);
                }
            }
            11 => {
                if b != b'-' {
                    return Err(CpfError::InvalidFormat);
                }
            }
            _ => {
                if !b.is_ascii_digit() {
                    return Err(CpfError::InvalidFormat);
                }
                digits[n] = b - b'0';
                n += 1;
            }
        }
    }
    Ok(digits)
}

/// Weighted sum starting at weight `start`, reduced mod 11 (10 maps to 0).
fn check_digit(start: u32, digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| (start + i as u32) * d as u32)
        .sum();
    match sum % 11 {
        10 => 0,
        r => r as u8,
    }
}
