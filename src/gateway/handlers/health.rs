use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{Json, extract::State};

use crate::deadline::run_within;
use crate::error::{BankError, ErrorResponse};
use crate::gateway::state::AppState;
use crate::gateway::types::HealthResponse;

/// Liveness check. Pings the database when one is configured.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 408, description = "Database ping timed out", body = ErrorResponse),
        (status = 500, description = "Database unreachable", body = ErrorResponse)
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, BankError> {
    if let Some(db) = &state.db {
        let timeout = state.transfers.config().request_timeout;
        ping(db.health_check(), timeout).await?;
    }
    Ok(Json(HealthResponse { ok: true }))
}

async fn ping<F>(check: F, timeout: Duration) -> Result<(), BankError>
where
    F: Future<Output = Result<(), sqlx::Error>>,
{
    run_within(timeout, async {
        check.await.map_err(|e| {
            tracing::error!(error = %e, "health check: database ping failed");
            BankError::database("store unavailable")
        })
    })
    .await
}
