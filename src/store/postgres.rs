//! PostgreSQL Ledger Store
//!
//! Settlement runs in one transaction: both rows are locked with
//! `SELECT ... FOR UPDATE` in ascending account-number order, the balance is
//! re-checked under the lock, and both updates commit together or not at all.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Account, Amount, Balance, NewAccount};

use super::{LedgerError, LedgerStore};

type AccountRow = (i64, String, String, i64, String, i64, DateTime<Utc>);

const ACCOUNT_COLUMNS: &str =
    "id, first_name, last_name, number, encrypted_password, balance, created_at";

fn account_from_row(row: AccountRow) -> Account {
    let (id, first_name, last_name, number, encrypted_password, balance, created_at) = row;
    Account {
        id,
        first_name,
        last_name,
        number,
        encrypted_password,
        balance,
        created_at,
    }
}

/// Ledger store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Create a new store with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, column: &str, value: i64) -> Result<Account, LedgerError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM account WHERE {} = $1",
            ACCOUNT_COLUMNS, column
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.map(account_from_row)
            .ok_or_else(|| LedgerError::AccountNotFound(value.to_string()))
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn create_account(&self, account: NewAccount) -> Result<Account, LedgerError> {
        Balance::new(account.balance)?;

        let result: Result<i64, sqlx::Error> = sqlx::query_scalar(
            r#"
            INSERT INTO account (first_name, last_name, number, encrypted_password, balance, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(account.number)
        .bind(&account.encrypted_password)
        .bind(account.balance)
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(account.into_account(id)),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(LedgerError::DuplicateNumber(account.number))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_account(&self, id: i64) -> Result<(), LedgerError> {
        // Blocks behind any settlement holding this row's lock
        let rows_affected = sqlx::query("DELETE FROM account WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(LedgerError::AccountNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let rows: Vec<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM account ORDER BY id",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(account_from_row).collect())
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Account, LedgerError> {
        self.fetch_one_by("id", id).await
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Account, LedgerError> {
        self.fetch_one_by("number", number).await
    }

    async fn send_money(&self, from: i64, to: i64, amount: Amount) -> Result<(), LedgerError> {
        let mut tx = self.pool.begin().await?;

        let locked: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT number, balance FROM account
            WHERE number = ANY($1)
            ORDER BY number
            FOR UPDATE
            "#,
        )
        .bind(vec![from, to])
        .fetch_all(&mut *tx)
        .await?;

        let balance_of = |number: i64| {
            locked
                .iter()
                .find(|(n, _)| *n == number)
                .map(|(_, balance)| *balance)
                .ok_or_else(|| LedgerError::AccountNotFound(number.to_string()))
        };

        let available = balance_of(from)?;
        balance_of(to)?;

        if available < amount.value() {
            // Dropping the transaction rolls it back and releases the locks
            return Err(LedgerError::InsufficientFunds {
                required: amount.value(),
                available,
            });
        }

        sqlx::query("UPDATE account SET balance = balance - $2 WHERE number = $1")
            .bind(from)
            .bind(amount.value())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE account SET balance = balance + $2 WHERE number = $1")
            .bind(to)
            .bind(amount.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(from, to, amount = amount.value(), "Settlement committed");

        Ok(())
    }
}
