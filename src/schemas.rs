use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::db::models::TransactionRecord;

/// Lifecycle of a transaction. `Pending` is the only non-terminal state and
/// is expected to resolve within the request that created it. `Declined` is
/// a valid terminal state with no producer yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Declined,
    Flagged,
}

pub const VALID_STATUSES: [&str; 4] = ["pending", "approved", "declined", "flagged"];

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Approved => "approved",
            TransactionStatus::Declined => "declined",
            TransactionStatus::Flagged => "flagged",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(TransactionStatus::Pending),
            "approved" => Ok(TransactionStatus::Approved),
            "declined" => Ok(TransactionStatus::Declined),
            "flagged" => Ok(TransactionStatus::Flagged),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionRequest {
    pub transaction_amount: f64,
    /// 1 if the transaction happened at night, 0 otherwise.
    pub is_nighttime: i32,
    pub category: String,
    pub transaction_location: String,
    pub job: String,
    pub state: String,
    #[serde(default)]
    pub transaction_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionCreateResponse {
    pub transaction_number: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub is_fraud: bool,
    pub fraud_probability: f64,
    pub notification_sent: bool,
    pub category: String,
    pub transaction_amount: f64,
    pub transaction_location: String,
}

impl TransactionCreateResponse {
    pub fn from_record(record: &TransactionRecord) -> Self {
        Self {
            transaction_number: record.transaction_number.clone(),
            status: record.status.clone(),
            created_at: record.created_at,
            is_fraud: record.is_fraud,
            fraud_probability: record.fraud_probability.unwrap_or(0.0),
            notification_sent: record.notification_sent,
            category: record.category.clone(),
            transaction_amount: record.transaction_amount,
            transaction_location: record.transaction_location.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetailResponse {
    pub id: String,
    pub transaction_number: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub is_fraud: bool,
    pub fraud_probability: Option<f64>,
    pub notification_sent: bool,
    pub category: String,
    pub transaction_amount: f64,
    pub transaction_location: String,
    pub job: String,
    pub state: String,
    pub is_nighttime: i32,
    /// Live status from the notifier, attached best-effort on single fetches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_status: Option<serde_json::Value>,
}

impl TransactionDetailResponse {
    pub fn from_record(record: &TransactionRecord) -> Self {
        Self {
            id: record.id.to_string(),
            transaction_number: record.transaction_number.clone(),
            status: record.status.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            is_fraud: record.is_fraud,
            fraud_probability: record.fraud_probability,
            notification_sent: record.notification_sent,
            category: record.category.clone(),
            transaction_amount: record.transaction_amount,
            transaction_location: record.transaction_location.clone(),
            job: record.job.clone(),
            state: record.state.clone(),
            is_nighttime: record.is_nighttime,
            notification_status: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedTransactions {
    pub success: bool,
    pub transactions: Vec<TransactionDetailResponse>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}
