use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::{NewTransaction, TransactionRecord, TransactionUpdate};
use crate::schemas::TransactionStatus;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("transaction_number already exists: {0}")]
    Duplicate(String),

    #[error("transaction not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Page of records plus the pagination bookkeeping the caller echoes back.
#[derive(Debug)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionRecord>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

/// Owns durable transaction storage. Constructed once at startup and
/// injected into the workflow; the pool is the only shared resource.
#[derive(Clone)]
pub struct TransactionStore {
    pool: PgPool,
    max_page_size: i64,
}

impl TransactionStore {
    pub fn new(pool: PgPool, max_page_size: i64) -> Self {
        Self {
            pool,
            max_page_size,
        }
    }

    /// Inserts a fresh record and returns it with the store-assigned id.
    /// The unique index on `transaction_number` guarantees that of two
    /// concurrent creates with the same number exactly one succeeds.
    pub async fn create(&self, new_tx: &NewTransaction) -> Result<TransactionRecord, StoreError> {
        sqlx::query_as::<_, TransactionRecord>(
            r#"
            INSERT INTO transactions (
                id, transaction_number, transaction_amount, is_nighttime,
                category, transaction_location, job, state, status,
                is_fraud, notification_sent, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE, FALSE, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_tx.transaction_number)
        .bind(new_tx.transaction_amount)
        .bind(new_tx.is_nighttime)
        .bind(&new_tx.category)
        .bind(&new_tx.transaction_location)
        .bind(&new_tx.job)
        .bind(&new_tx.state)
        .bind(new_tx.status.as_str())
        .bind(new_tx.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(new_tx.transaction_number.clone())
            } else {
                StoreError::Database(e)
            }
        })
    }

    /// Point lookup by store-assigned id or by transaction number. Input
    /// that does not parse as a UUID is not an error; it simply falls
    /// through to the transaction-number lookup.
    pub async fn fetch(&self, id: &str) -> Result<Option<TransactionRecord>, StoreError> {
        if let Ok(uuid) = Uuid::parse_str(id) {
            let found =
                sqlx::query_as::<_, TransactionRecord>("SELECT * FROM transactions WHERE id = $1")
                    .bind(uuid)
                    .fetch_optional(&self.pool)
                    .await?;

            if found.is_some() {
                return Ok(found);
            }
        }

        let found = sqlx::query_as::<_, TransactionRecord>(
            "SELECT * FROM transactions WHERE transaction_number = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    /// Merges the set fields into the existing record, last-write-wins per
    /// field, and stamps `updated_at`. Returns whether a row was changed.
    pub async fn update(&self, id: Uuid, update: &TransactionUpdate) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE transactions SET
                status = COALESCE($2, status),
                is_fraud = COALESCE($3, is_fraud),
                fraud_probability = COALESCE($4, fraud_probability),
                fraud_check_result = COALESCE($5, fraud_check_result),
                notification_result = COALESCE($6, notification_result),
                notification_sent = COALESCE($7, notification_sent),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.is_fraud)
        .bind(update.fraud_probability)
        .bind(&update.fraud_check_result)
        .bind(&update.notification_result)
        .bind(update.notification_sent)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        Ok(true)
    }

    /// Exact-match filtered listing, newest first, with total and page count.
    pub async fn list(
        &self,
        page: i64,
        limit: i64,
        status: Option<TransactionStatus>,
    ) -> Result<TransactionPage, StoreError> {
        let limit = limit.min(self.max_page_size);
        let offset = (page - 1) * limit;
        let status = status.map(|s| s.as_str());

        let transactions = sqlx::query_as::<_, TransactionRecord>(
            r#"
            SELECT * FROM transactions
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM transactions WHERE ($1::text IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(TransactionPage {
            transactions,
            page,
            limit,
            total,
            pages: compute_pages(total, limit),
        })
    }
}

pub fn compute_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_is_ceiling_of_total_over_limit() {
        assert_eq!(compute_pages(95, 10), 10);
        assert_eq!(compute_pages(100, 10), 10);
        assert_eq!(compute_pages(101, 10), 11);
        assert_eq!(compute_pages(0, 10), 0);
        assert_eq!(compute_pages(1, 10), 1);
    }
}
