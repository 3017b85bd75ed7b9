use std::fmt;
use std::str::FromStr;

use crate::schemas::{TransactionStatus, VALID_STATUSES};

pub const MAX_PAGE_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

pub type ValidationResult = Result<(), ValidationError>;

pub fn validate_positive_amount(amount: f64) -> ValidationResult {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::new(
            "transaction_amount",
            "must be greater than zero",
        ));
    }

    Ok(())
}

pub fn validate_page(page: i64) -> ValidationResult {
    if page < 1 {
        return Err(ValidationError::new("page", "must be at least 1"));
    }

    Ok(())
}

pub fn validate_limit(limit: i64) -> ValidationResult {
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ValidationError::new(
            "limit",
            format!("must be between 1 and {}", MAX_PAGE_LIMIT),
        ));
    }

    Ok(())
}

pub fn parse_status_filter(value: &str) -> Result<TransactionStatus, ValidationError> {
    TransactionStatus::from_str(value).map_err(|_| {
        ValidationError::new(
            "status",
            format!("invalid status, must be one of: {}", VALID_STATUSES.join(", ")),
        )
    })
}
