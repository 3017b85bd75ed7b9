use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

use crate::clients::error_detail;
use crate::db::models::NewTransaction;

/// Normalized verdict from the fraud evaluator. The client never returns an
/// error: an unreachable or failing evaluator becomes `Unavailable`, which
/// reads as not-fraud.
#[derive(Debug, Clone, PartialEq)]
pub enum FraudEvaluation {
    Scored {
        is_fraud: bool,
        fraud_probability: f64,
        label: Option<String>,
        timestamp: Option<String>,
    },
    Unavailable {
        error: String,
    },
}

impl FraudEvaluation {
    pub fn is_fraud(&self) -> bool {
        match self {
            FraudEvaluation::Scored { is_fraud, .. } => *is_fraud,
            FraudEvaluation::Unavailable { .. } => false,
        }
    }

    pub fn fraud_probability(&self) -> f64 {
        match self {
            FraudEvaluation::Scored {
                fraud_probability, ..
            } => *fraud_probability,
            FraudEvaluation::Unavailable { .. } => 0.0,
        }
    }

    /// Blob persisted under `fraud_check_result`.
    pub fn to_record(&self) -> Value {
        match self {
            FraudEvaluation::Scored {
                is_fraud,
                fraud_probability,
                label,
                timestamp,
            } => json!({
                "success": true,
                "is_fraud": is_fraud,
                "fraud_probability": fraud_probability,
                "label": label,
                "timestamp": timestamp,
            }),
            FraudEvaluation::Unavailable { error } => json!({
                "success": false,
                "error": error,
                "is_fraud": false,
                "fraud_probability": 0.0,
            }),
        }
    }
}

/// HTTP client for the external fraud-scoring service.
#[derive(Clone)]
pub struct FraudClient {
    client: Client,
    base_url: String,
}

impl FraudClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        FraudClient { client, base_url }
    }

    /// Scores a transaction. Projects exactly the fields the evaluator
    /// expects; extra attributes are never forwarded.
    pub async fn evaluate(&self, tx: &NewTransaction) -> FraudEvaluation {
        let url = format!("{}/predict", self.base_url.trim_end_matches('/'));
        let payload = json!({
            "transaction_amount": tx.transaction_amount,
            "is_nighttime": tx.is_nighttime,
            "category": tx.category,
            "transaction_location": tx.transaction_location,
            "job": tx.job,
            "state": tx.state,
            "transaction_number": tx.transaction_number,
        });

        tracing::info!(
            transaction_number = %tx.transaction_number,
            "requesting fraud evaluation"
        );

        let response = match self.client.post(&url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = format!("error reaching fraud evaluator: {}", e);
                tracing::warn!(transaction_number = %tx.transaction_number, "{}", error);
                return FraudEvaluation::Unavailable { error };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            let error = format!("fraud evaluator returned {}: {}", status.as_u16(), detail);
            tracing::warn!(transaction_number = %tx.transaction_number, "{}", error);
            return FraudEvaluation::Unavailable { error };
        }

        match response.json::<Value>().await {
            Ok(body) => {
                let evaluation = FraudEvaluation::Scored {
                    is_fraud: body.get("is_fraud").and_then(Value::as_bool).unwrap_or(false),
                    fraud_probability: body
                        .get("fraud_probability")
                        .and_then(Value::as_f64)
                        .unwrap_or(0.0),
                    label: body.get("label").and_then(Value::as_str).map(str::to_owned),
                    timestamp: body
                        .get("timestamp")
                        .and_then(Value::as_str)
                        .map(str::to_owned),
                };
                tracing::info!(
                    transaction_number = %tx.transaction_number,
                    is_fraud = evaluation.is_fraud(),
                    fraud_probability = evaluation.fraud_probability(),
                    "fraud evaluation completed"
                );
                evaluation
            }
            Err(e) => FraudEvaluation::Unavailable {
                error: format!("invalid response from fraud evaluator: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::TransactionStatus;
    use chrono::Utc;

    fn sample_transaction() -> NewTransaction {
        NewTransaction {
            transaction_number: "txn_1001".to_string(),
            transaction_amount: 150.55,
            is_nighttime: 1,
            category: "shopping_pos".to_string(),
            transaction_location: "-95.79,36.15".to_string(),
            job: "architect".to_string(),
            state: "CA".to_string(),
            status: TransactionStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn scored_verdict_is_parsed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/predict")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"is_fraud": true, "fraud_probability": 0.92, "label": "fraud", "timestamp": "2024-01-01T00:00:00Z"}"#,
            )
            .create_async()
            .await;

        let client = FraudClient::new(server.url(), 5);
        let evaluation = client.evaluate(&sample_transaction()).await;

        assert!(evaluation.is_fraud());
        assert_eq!(evaluation.fraud_probability(), 0.92);
        assert_eq!(evaluation.to_record()["success"], true);
    }

    #[tokio::test]
    async fn missing_sub_fields_default_to_safe_values() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/predict")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let client = FraudClient::new(server.url(), 5);
        let evaluation = client.evaluate(&sample_transaction()).await;

        assert!(!evaluation.is_fraud());
        assert_eq!(evaluation.fraud_probability(), 0.0);
    }

    #[tokio::test]
    async fn evaluator_failure_reads_as_not_fraud() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/predict")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "model unavailable"}"#)
            .create_async()
            .await;

        let client = FraudClient::new(server.url(), 5);
        let evaluation = client.evaluate(&sample_transaction()).await;

        assert!(!evaluation.is_fraud());
        assert_eq!(evaluation.fraud_probability(), 0.0);
        match &evaluation {
            FraudEvaluation::Unavailable { error } => {
                assert!(error.contains("500"));
                assert!(error.contains("model unavailable"));
            }
            other => panic!("expected Unavailable, got {:?}", other),
        }

        let record = evaluation.to_record();
        assert_eq!(record["success"], false);
        assert_eq!(record["is_fraud"], false);
    }

    #[tokio::test]
    async fn unreachable_evaluator_reads_as_not_fraud() {
        // Nothing listens on this port.
        let client = FraudClient::new("http://127.0.0.1:9".to_string(), 1);
        let evaluation = client.evaluate(&sample_transaction()).await;

        assert!(!evaluation.is_fraud());
        assert!(matches!(evaluation, FraudEvaluation::Unavailable { .. }));
    }
}
