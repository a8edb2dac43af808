//! Deadline-bound execution
//!
//! Services race their store calls against a deadline. The losing future is
//! dropped; a dropped sqlx transaction issues ROLLBACK, so an abandoned unit of
//! work never commits.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};

use crate::error::BankError;

/// Run `fut` until `deadline`, mapping expiry to [`BankError::Timeout`].
pub async fn run_until<T, F>(deadline: Instant, fut: F) -> Result<T, BankError>
where
    F: Future<Output = Result<T, BankError>>,
{
    match timeout_at(deadline, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("operation abandoned: deadline exceeded");
            Err(BankError::Timeout)
        }
    }
}

/// Run `fut` with a relative timeout.
pub async fn run_within<T, F>(timeout: Duration, fut: F) -> Result<T, BankError>
where
    F: Future<Output = Result<T, BankError>>,
{
    run_until(Instant::now() + timeout, fut).await
}
