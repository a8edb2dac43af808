//! Structural validation of transfer requests. Pure: no I/O.

use super::types::{NewTransfer, TransferRequest};
use crate::error::BankError;

/// Reject malformed requests before any store call.
///
/// Missing or non-positive `amount` and missing `destination` are reported
/// together. A transfer to the caller's own account is rejected afterwards.
pub fn validate_transfer(req: &TransferRequest) -> Result<NewTransfer, BankError> {
    let mut invalid = Vec::new();

    let amount = match req.amount {
        Some(amount) if amount > 0 => Some(amount),
        _ => {
            invalid.push("amount");
            None
        }
    };

    if req.destination.is_none() {
        invalid.push("destination");
    }

    let (Some(amount), Some(destination)) = (amount, req.destination) else {
        return Err(BankError::invalid_fields(&invalid));
    };

    if destination == req.origin {
        return Err(BankError::argument(
            "destination must differ from origin account",
        ));
    }

    Ok(NewTransfer {
        origin: req.origin,
        destination,
        amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let t = validate_transfer(&TransferRequest::new(1, 2, 300)).unwrap();
        assert_eq!(
            t,
            NewTransfer {
                origin: 1,
                destination: 2,
                amount: 300
            }
        );
    }

    #[test]
    fn test_zero_and_negative_amount() {
        for amount in [0, -1, i64::MIN] {
            assert_eq!(
                validate_transfer(&TransferRequest::new(1, 2, amount)),
                Err(BankError::argument("amount"))
            );
        }
    }

    #[test]
    fn test_missing_fields_accumulate() {
        let req = TransferRequest {
            origin: 1,
            ..Default::default()
        };
        assert_eq!(
            validate_transfer(&req),
            Err(BankError::argument("amount, destination"))
        );
    }

    #[test]
    fn test_missing_destination_only() {
        let req = TransferRequest {
            origin: 1,
            destination: None,
            amount: Some(10),
        };
        assert_eq!(
            validate_transfer(&req),
            Err(BankError::argument("destination"))
        );
    }

    #[test]
    fn test_self_transfer_rejected() {
        let err = validate_transfer(&TransferRequest::new(5, 5, 10)).unwrap_err();
        assert!(matches!(err, BankError::Argument(_)));
    }
}
