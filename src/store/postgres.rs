//! PostgreSQL store
//!
//! Transfers run in one transaction: both account rows are locked with
//! `SELECT ... FOR UPDATE` in ascending id order (so opposite-direction
//! transfers cannot deadlock), then the record is inserted and the balances
//! are moved with conditional updates. A debit that would go negative or a
//! credit that would overflow affects zero rows and aborts the transaction.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};

use crate::account::{
    Account, AccountId, AccountRepository, AccountSummary, ListAccountQuery, ListAccountsResponse,
    NewAccount,
};
use crate::auth::CredentialStore;
use crate::error::{BankError, db_error};
use crate::transfer::store::{DESTINATION_OVERFLOW, NOT_ENOUGH_FUNDS, account_not_found};
use crate::transfer::{
    LedgerStore, ListTransferQuery, ListTransferResponse, NewTransfer, TransferRecord,
    TransferView,
};

const ACCOUNT_COLUMNS: &str =
    "id, name, cpf, secret, balance, active, created_at, updated_at";

const SNAPSHOT_READ: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_account(&self, id: AccountId) -> Result<Option<Account>, BankError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id as i64)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("failed to read account"))?;

        row.as_ref()
            .map(row_to_account)
            .transpose()
            .map_err(db_error("failed to decode account"))
    }

    /// Steps of the transfer unit of work. The caller owns commit/rollback.
    async fn apply_transfer(
        conn: &mut PgConnection,
        t: &NewTransfer,
    ) -> Result<TransferRecord, BankError> {
        let (origin, destination) = (t.origin as i64, t.destination as i64);

        let locked: Vec<i64> = sqlx::query_scalar(
            "SELECT id FROM accounts WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(vec![origin, destination])
        .fetch_all(&mut *conn)
        .await
        .map_err(db_error("failed to lock accounts"))?;

        for id in [origin, destination] {
            if !locked.contains(&id) {
                return Err(account_not_found(id as AccountId));
            }
        }

        let row = sqlx::query(
            r#"
            INSERT INTO transfers (account_origin_id, account_destination_id, amount)
            VALUES ($1, $2, $3)
            RETURNING id, created_at
            "#,
        )
        .bind(origin)
        .bind(destination)
        .bind(t.amount)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_error("failed to insert transfer record"))?;

        let debited = sqlx::query(
            r#"
            UPDATE accounts SET balance = balance - $1, updated_at = NOW()
            WHERE id = $2 AND balance >= $1
            "#,
        )
        .bind(t.amount)
        .bind(origin)
        .execute(&mut *conn)
        .await
        .map_err(db_error("failed to debit origin account"))?;

        if debited.rows_affected() == 0 {
            return Err(BankError::transfer(NOT_ENOUGH_FUNDS));
        }

        let credited = sqlx::query(
            r#"
            UPDATE accounts SET balance = balance + $1, updated_at = NOW()
            WHERE id = $2 AND balance <= $3 - $1
            "#,
        )
        .bind(t.amount)
        .bind(destination)
        .bind(i64::MAX)
        .execute(&mut *conn)
        .await
        .map_err(db_error("failed to credit destination account"))?;

        if credited.rows_affected() == 0 {
            return Err(BankError::transfer(DESTINATION_OVERFLOW));
        }

        Ok(TransferRecord {
            id: row
                .try_get("id")
                .map_err(db_error("failed to decode transfer record"))?,
            origin: t.origin,
            destination: t.destination,
            amount: t.amount,
            created_at: row
                .try_get("created_at")
                .map_err(db_error("failed to decode transfer record"))?,
        })
    }
}

fn row_to_account(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: row.try_get::<i64, _>("id")? as AccountId,
        name: row.try_get("name")?,
        cpf: row.try_get("cpf")?,
        balance: row.try_get("balance")?,
        secret_hash: row.try_get("secret")?,
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_view(row: &PgRow) -> Result<TransferView, sqlx::Error> {
    Ok(TransferView {
        amount: row.try_get::<i64, _>("amount")? as u64,
        created_at: row.try_get("created_at")?,
        destination_name: row.try_get("destination_name")?,
        destination_cpf: row.try_get("destination_cpf")?,
        origin_name: row.try_get("origin_name")?,
        origin_cpf: row.try_get("origin_cpf")?,
    })
}

#[async_trait]
impl AccountRepository for PgStore {
    async fn add_account(&self, account: NewAccount) -> Result<AccountId, BankError> {
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO accounts (name, cpf, secret, balance, active)
            VALUES ($1, $2, $3, $4, TRUE)
            RETURNING id
            "#,
        )
        .bind(&account.name)
        .bind(&account.cpf)
        .bind(&account.secret_hash)
        .bind(account.balance)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id as AccountId),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(BankError::argument("cpf already registered"))
            }
            Err(e) => Err(db_error("failed to insert account")(e)),
        }
    }

    async fn list_accounts(
        &self,
        query: ListAccountQuery,
    ) -> Result<ListAccountsResponse, BankError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("failed to start transaction"))?;
        sqlx::query(SNAPSHOT_READ)
            .execute(&mut *tx)
            .await
            .map_err(db_error("failed to start transaction"))?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("failed to count accounts"))?;

        let rows = sqlx::query(
            "SELECT id, name, cpf, balance FROM accounts ORDER BY id ASC LIMIT $1 OFFSET $2",
        )
        .bind(query.page_size)
        .bind(query.offset())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("failed to list accounts"))?;

        tx.commit()
            .await
            .map_err(db_error("failed to finish transaction"))?;

        let data = rows
            .iter()
            .map(|r| -> Result<AccountSummary, sqlx::Error> {
                Ok(AccountSummary {
                    id: r.try_get::<i64, _>("id")? as AccountId,
                    name: r.try_get("name")?,
                    cpf: r.try_get("cpf")?,
                    balance: r.try_get("balance")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error("failed to decode accounts"))?;

        Ok(ListAccountsResponse {
            total,
            page: query.page + 1,
            data,
        })
    }

    async fn get_account_balance(&self, id: AccountId) -> Result<i64, BankError> {
        sqlx::query_scalar::<_, i64>("SELECT balance FROM accounts WHERE id = $1")
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("failed to read account balance"))?
            .ok_or_else(|| account_not_found(id))
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn get_account_by_cpf(&self, cpf: &str) -> Result<Account, BankError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE cpf = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(cpf)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("failed to read account"))?
        .ok_or_else(|| BankError::not_found("no account with this cpf"))?;

        row_to_account(&row).map_err(db_error("failed to decode account"))
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn get_account_balance(&self, id: AccountId) -> Result<i64, BankError> {
        AccountRepository::get_account_balance(self, id).await
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Account, BankError> {
        self.fetch_account(id)
            .await?
            .ok_or_else(|| account_not_found(id))
    }

    async fn add_transfer(&self, t: &NewTransfer) -> Result<TransferRecord, BankError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("failed to start transaction"))?;

        match Self::apply_transfer(&mut *tx, t).await {
            Ok(record) => {
                tx.commit()
                    .await
                    .map_err(db_error("failed to commit transfer"))?;
                Ok(record)
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    // The connection discards the transaction when it is closed
                    tracing::error!(error = %rb, "transfer rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn get_transfers(
        &self,
        account_id: AccountId,
        query: ListTransferQuery,
    ) -> Result<ListTransferResponse, BankError> {
        let id = account_id as i64;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("failed to start transaction"))?;
        sqlx::query(SNAPSHOT_READ)
            .execute(&mut *tx)
            .await
            .map_err(db_error("failed to start transaction"))?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transfers WHERE account_origin_id = $1 OR account_destination_id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("failed to count transfers"))?;

        let rows = sqlx::query(
            r#"
            SELECT t.amount, t.created_at,
                   d.name AS destination_name, d.cpf AS destination_cpf,
                   o.name AS origin_name, o.cpf AS origin_cpf
            FROM transfers t
            JOIN accounts o ON o.id = t.account_origin_id
            JOIN accounts d ON d.id = t.account_destination_id
            WHERE t.account_origin_id = $1 OR t.account_destination_id = $1
            ORDER BY t.id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(id)
        .bind(query.page_size)
        .bind(query.offset())
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("failed to list transfers"))?;

        tx.commit()
            .await
            .map_err(db_error("failed to finish transaction"))?;

        let data = rows
            .iter()
            .map(row_to_view)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_error("failed to decode transfers"))?;

        Ok(ListTransferResponse {
            total,
            page: query.page + 1,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PostgresConfig;
    use crate::db::{Database, schema};

    // Requires a disposable database:
    // DATABASE_URL=postgres://... cargo test -- --ignored

    async fn store() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = Database::connect(&PostgresConfig {
            url,
            max_connections: 5,
            acquire_timeout_ms: 5_000,
        })
        .await
        .expect("Failed to connect");
        schema::init_schema(db.pool()).await.expect("schema");
        PgStore::new(db.pool().clone())
    }

    async fn account(store: &PgStore, balance: i64) -> AccountId {
        // Unique per call; the checksum is irrelevant at this layer
        let cpf = format!("{:014}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0));
        store
            .add_account(NewAccount {
                name: "pg test".into(),
                cpf,
                secret_hash: "hash".into(),
                balance,
            })
            .await
            .expect("insert account")
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_transfer_moves_funds_and_records() {
        let store = store().await;
        let a = account(&store, 1000).await;
        let b = account(&store, 500).await;

        let t = NewTransfer {
            origin: a,
            destination: b,
            amount: 300,
        };
        let record = store.add_transfer(&t).await.unwrap();
        assert_eq!(record.amount, 300);

        assert_eq!(LedgerStore::get_account_balance(&store, a).await, Ok(700));
        assert_eq!(LedgerStore::get_account_balance(&store, b).await, Ok(800));

        let page = store
            .get_transfers(
                a,
                ListTransferQuery {
                    page_size: 15,
                    page: 0,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].amount, 300);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_insufficient_funds_rolls_back_record() {
        let store = store().await;
        let a = account(&store, 100).await;
        let b = account(&store, 0).await;

        let err = store
            .add_transfer(&NewTransfer {
                origin: a,
                destination: b,
                amount: 500,
            })
            .await
            .unwrap_err();
        assert_eq!(err, BankError::transfer(NOT_ENOUGH_FUNDS));

        let page = store
            .get_transfers(
                a,
                ListTransferQuery {
                    page_size: 15,
                    page: 0,
                },
            )
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(LedgerStore::get_account_balance(&store, a).await, Ok(100));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_concurrent_debits_serialize() {
        let store = std::sync::Arc::new(store().await);
        let a = account(&store, 400).await;
        let b = account(&store, 0).await;
        let t = NewTransfer {
            origin: a,
            destination: b,
            amount: 400,
        };

        let (s1, s2) = (store.clone(), store.clone());
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { s1.add_transfer(&t).await }),
            tokio::spawn(async move { s2.add_transfer(&t).await }),
        );
        let results = [r1.unwrap(), r2.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(LedgerStore::get_account_balance(&*store, a).await, Ok(0));
        assert_eq!(LedgerStore::get_account_balance(&*store, b).await, Ok(400));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL database"]
    async fn test_unknown_destination() {
        let store = store().await;
        let a = account(&store, 100).await;
        let err = store
            .add_transfer(&NewTransfer {
                origin: a,
                destination: i64::MAX as u64,
                amount: 10,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, BankError::AccountNotFound(_)));
    }
}
