use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;

use crate::clients::error_detail;
use crate::clients::fraud::FraudEvaluation;
use crate::db::models::NewTransaction;

/// Outcome of a conditional fraud notification. Like the fraud client, this
/// never returns an error: a failed delivery becomes `Failed` and is
/// recorded on the transaction, not thrown at the workflow.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationOutcome {
    /// No fraud detected, the notifier was never invoked.
    Skipped,
    Sent {
        notification_number: Option<String>,
        status: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl NotificationOutcome {
    pub fn sent(&self) -> bool {
        matches!(self, NotificationOutcome::Sent { .. })
    }

    /// Blob persisted under `notification_result`.
    pub fn to_record(&self) -> Value {
        match self {
            NotificationOutcome::Skipped => json!({
                "success": true,
                "notification_sent": false,
                "message": "no fraud detected, notification not sent",
            }),
            NotificationOutcome::Sent {
                notification_number,
                status,
            } => json!({
                "success": true,
                "notification_sent": true,
                "notification_number": notification_number,
                "status": status,
            }),
            NotificationOutcome::Failed { error } => json!({
                "success": false,
                "notification_sent": false,
                "error": error,
            }),
        }
    }
}

/// Result of a notification status lookup. A 404 from the collaborator is a
/// valid "no notification exists yet" answer, distinct from an outage.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationStatusLookup {
    Found(Value),
    NotFound,
    Unavailable { error: String },
}

/// HTTP client for the external notification service.
#[derive(Clone)]
pub struct NotificationClient {
    client: Client,
    base_url: String,
}

impl NotificationClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        NotificationClient { client, base_url }
    }

    /// Sends a fraud notification, short-circuiting when the evaluation is
    /// not fraud.
    pub async fn notify_fraud(
        &self,
        tx: &NewTransaction,
        evaluation: &FraudEvaluation,
    ) -> NotificationOutcome {
        if !evaluation.is_fraud() {
            return NotificationOutcome::Skipped;
        }

        let url = format!("{}/notifications/send", self.base_url.trim_end_matches('/'));
        let payload = json!({
            "transaction_number": tx.transaction_number,
            "transaction_amount": tx.transaction_amount,
            "fraud_probability": evaluation.fraud_probability(),
            "is_nighttime": tx.is_nighttime,
            "category": tx.category,
            "transaction_location": tx.transaction_location,
            "job": tx.job,
            "state": tx.state,
        });

        tracing::info!(
            transaction_number = %tx.transaction_number,
            "sending fraud notification"
        );

        let response = match self.client.post(&url).json(&payload).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = format!("error reaching notification service: {}", e);
                tracing::warn!(transaction_number = %tx.transaction_number, "{}", error);
                return NotificationOutcome::Failed { error };
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = error_detail(response).await;
            let error = format!(
                "notification service returned {}: {}",
                status.as_u16(),
                detail
            );
            tracing::warn!(transaction_number = %tx.transaction_number, "{}", error);
            return NotificationOutcome::Failed { error };
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        NotificationOutcome::Sent {
            notification_number: body.get("_id").and_then(Value::as_str).map(str::to_owned),
            status: body.get("status").and_then(Value::as_str).map(str::to_owned),
        }
    }

    /// Looks up the live delivery status for a transaction's notification.
    pub async fn check_status(&self, transaction_number: &str) -> NotificationStatusLookup {
        let url = format!(
            "{}/notifications/status/{}",
            self.base_url.trim_end_matches('/'),
            transaction_number
        );

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                return NotificationStatusLookup::Unavailable {
                    error: format!("error reaching notification service: {}", e),
                };
            }
        };

        let status = response.status();
        if status.as_u16() == 404 {
            return NotificationStatusLookup::NotFound;
        }
        if !status.is_success() {
            let detail = error_detail(response).await;
            return NotificationStatusLookup::Unavailable {
                error: format!(
                    "notification service returned {}: {}",
                    status.as_u16(),
                    detail
                ),
            };
        }

        match response.json::<Value>().await {
            Ok(body) => NotificationStatusLookup::Found(body),
            Err(e) => NotificationStatusLookup::Unavailable {
                error: format!("invalid response from notification service: {}", e),
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

    fn fraud_evaluation() -> FraudEvaluation {
        FraudEvaluation::Scored {
            is_fraud: true,
            fraud_probability: 0.92,
            label: Some("fraud".to_string()),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn non_fraud_short_circuits_without_a_request() {
        // Port 9 is closed; a real request would fail, not skip.
        let client = NotificationClient::new("http://127.0.0.1:9".to_string(), 1);
        let evaluation = FraudEvaluation::Scored {
            is_fraud: false,
            fraud_probability: 0.05,
            label: None,
            timestamp: None,
        };

        let outcome = client.notify_fraud(&sample_transaction(), &evaluation).await;

        assert_eq!(outcome, NotificationOutcome::Skipped);
        assert!(!outcome.sent());
    }

    #[tokio::test]
    async fn unavailable_evaluation_also_short_circuits() {
        let client = NotificationClient::new("http://127.0.0.1:9".to_string(), 1);
        let evaluation = FraudEvaluation::Unavailable {
            error: "timeout".to_string(),
        };

        let outcome = client.notify_fraud(&sample_transaction(), &evaluation).await;

        assert_eq!(outcome, NotificationOutcome::Skipped);
    }

    #[tokio::test]
    async fn delivery_is_reported_with_collaborator_ids() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/notifications/send")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"_id": "ntf_42", "status": "queued"}"#)
            .create_async()
            .await;

        let client = NotificationClient::new(server.url(), 5);
        let outcome = client
            .notify_fraud(&sample_transaction(), &fraud_evaluation())
            .await;

        assert!(outcome.sent());
        let record = outcome.to_record();
        assert_eq!(record["notification_sent"], true);
        assert_eq!(record["notification_number"], "ntf_42");
        assert_eq!(record["status"], "queued");
    }

    #[tokio::test]
    async fn delivery_failure_never_throws() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/notifications/send")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail": "queue full"}"#)
            .create_async()
            .await;

        let client = NotificationClient::new(server.url(), 5);
        let outcome = client
            .notify_fraud(&sample_transaction(), &fraud_evaluation())
            .await;

        assert!(!outcome.sent());
        let record = outcome.to_record();
        assert_eq!(record["success"], false);
        assert_eq!(record["notification_sent"], false);
    }

    #[tokio::test]
    async fn missing_notification_is_a_valid_answer() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/notifications/status/txn_1001")
            .with_status(404)
            .create_async()
            .await;

        let client = NotificationClient::new(server.url(), 5);
        let lookup = client.check_status("txn_1001").await;

        assert_eq!(lookup, NotificationStatusLookup::NotFound);
    }

    #[tokio::test]
    async fn status_lookup_returns_collaborator_payload() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/notifications/status/txn_1001")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"_id": "ntf_42", "status": "delivered"}"#)
            .create_async()
            .await;

        let client = NotificationClient::new(server.url(), 5);
        let lookup = client.check_status("txn_1001").await;

        match lookup {
            NotificationStatusLookup::Found(body) => {
                assert_eq!(body["status"], "delivered");
            }
            other => panic!("expected Found, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn status_lookup_outage_is_distinct_from_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/notifications/status/txn_1001")
            .with_status(500)
            .create_async()
            .await;

        let client = NotificationClient::new(server.url(), 5);
        let lookup = client.check_status("txn_1001").await;

        assert!(matches!(
            lookup,
            NotificationStatusLookup::Unavailable { .. }
        ));
    }
}
