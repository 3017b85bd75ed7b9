use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::schemas::{CreateTransactionRequest, TransactionStatus};

/// A durably stored transaction. The workflow is the sole writer of the
/// derived fields (`status`, `is_fraud`, `fraud_probability`,
/// `notification_sent`); the store owns identifier assignment.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub transaction_number: String,
    pub transaction_amount: f64,
    pub is_nighttime: i32,
    pub category: String,
    pub transaction_location: String,
    pub job: String,
    pub state: String,
    pub status: String,
    pub is_fraud: bool,
    pub fraud_probability: Option<f64>,
    pub fraud_check_result: Option<serde_json::Value>,
    pub notification_result: Option<serde_json::Value>,
    pub notification_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert shape for a fresh transaction, before any fraud evaluation ran.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_number: String,
    pub transaction_amount: f64,
    pub is_nighttime: i32,
    pub category: String,
    pub transaction_location: String,
    pub job: String,
    pub state: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    pub fn from_request(request: CreateTransactionRequest, transaction_number: String) -> Self {
        Self {
            transaction_number,
            transaction_amount: request.transaction_amount,
            is_nighttime: request.is_nighttime,
            category: request.category,
            transaction_location: request.transaction_location,
            job: request.job,
            state: request.state,
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        }
    }
}

/// Partial update merged into an existing record, last-write-wins per field.
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub status: Option<TransactionStatus>,
    pub is_fraud: Option<bool>,
    pub fraud_probability: Option<f64>,
    pub fraud_check_result: Option<serde_json::Value>,
    pub notification_result: Option<serde_json::Value>,
    pub notification_sent: Option<bool>,
}
