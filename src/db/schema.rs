//! PostgreSQL schema bootstrap

use anyhow::Result;
use sqlx::PgPool;

const CREATE_ACCOUNTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id          BIGSERIAL PRIMARY KEY,
    name        TEXT        NOT NULL,
    cpf         TEXT        NOT NULL UNIQUE,
    secret      TEXT        NOT NULL,
    balance     BIGINT      NOT NULL CHECK (balance >= 0),
    active      BOOLEAN     NOT NULL DEFAULT TRUE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_TRANSFERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transfers (
    id                      BIGSERIAL PRIMARY KEY,
    account_origin_id       BIGINT      NOT NULL REFERENCES accounts (id),
    account_destination_id  BIGINT      NOT NULL REFERENCES accounts (id),
    amount                  BIGINT      NOT NULL CHECK (amount > 0),
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_TRANSFER_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS transfers_origin_idx ON transfers (account_origin_id)",
    "CREATE INDEX IF NOT EXISTS transfers_destination_idx ON transfers (account_destination_id)",
];

/// Create tables and indexes if they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing PostgreSQL schema...");

    sqlx::query(CREATE_ACCOUNTS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", "Failed to create accounts table", e))?;

    sqlx::query(CREATE_TRANSFERS_TABLE)
        .execute(pool)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", "Failed to create transfers table", e))?;

    for stmt in CREATE_TRANSFER_INDEXES {
        sqlx::query(stmt)
            .execute(pool)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", "Failed to create transfer index", e))?;
    }

    tracing::info!("PostgreSQL schema initialized successfully");
    Ok(())
}
