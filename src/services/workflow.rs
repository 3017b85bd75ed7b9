use uuid::Uuid;

use crate::clients::{FraudClient, NotificationClient, NotificationStatusLookup};
use crate::db::TransactionStore;
use crate::db::models::{NewTransaction, TransactionUpdate};
use crate::error::AppError;
use crate::schemas::{
    CreateTransactionRequest, PaginatedTransactions, TransactionCreateResponse,
    TransactionDetailResponse, TransactionStatus,
};

/// Orchestrates a transaction end to end: persist pending, evaluate fraud,
/// conditionally notify, reconcile the stored status, and answer reads.
///
/// Failure policy is asymmetric: storage errors abort the workflow,
/// collaborator errors degrade to safe defaults (fail-open).
#[derive(Clone)]
pub struct TransactionWorkflow {
    store: TransactionStore,
    fraud: FraudClient,
    notifier: NotificationClient,
}

impl TransactionWorkflow {
    pub fn new(store: TransactionStore, fraud: FraudClient, notifier: NotificationClient) -> Self {
        Self {
            store,
            fraud,
            notifier,
        }
    }

    /// Processes a new transaction. The pending record is durable before any
    /// collaborator is consulted, so concurrent readers may observe the
    /// transient `pending` status.
    pub async fn process(
        &self,
        request: CreateTransactionRequest,
    ) -> Result<TransactionCreateResponse, AppError> {
        let transaction_number = request
            .transaction_number
            .clone()
            .unwrap_or_else(generate_transaction_number);
        let new_tx = NewTransaction::from_request(request, transaction_number);

        let saved = self.store.create(&new_tx).await.map_err(|e| {
            tracing::error!(
                transaction_number = %new_tx.transaction_number,
                error = %e,
                "failed to persist incoming transaction"
            );
            e
        })?;

        let evaluation = self.fraud.evaluate(&new_tx).await;

        let mut update = TransactionUpdate {
            fraud_check_result: Some(evaluation.to_record()),
            is_fraud: Some(evaluation.is_fraud()),
            fraud_probability: Some(evaluation.fraud_probability()),
            ..Default::default()
        };

        if evaluation.is_fraud() {
            update.status = Some(TransactionStatus::Flagged);

            let outcome = self.notifier.notify_fraud(&new_tx, &evaluation).await;
            update.notification_result = Some(outcome.to_record());
            update.notification_sent = Some(outcome.sent());
        } else {
            update.status = Some(TransactionStatus::Approved);
        }

        self.store.update(saved.id, &update).await.map_err(|e| {
            tracing::error!(
                transaction_number = %saved.transaction_number,
                error = %e,
                "failed to record fraud evaluation outcome"
            );
            e
        })?;

        // Re-read instead of echoing the update so the response reflects
        // exactly what is durable.
        let stored = self
            .store
            .fetch(&saved.id.to_string())
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "transaction {} disappeared after update",
                    saved.transaction_number
                ))
            })?;

        tracing::info!(
            transaction_number = %stored.transaction_number,
            status = %stored.status,
            notification_sent = stored.notification_sent,
            "transaction processed"
        );

        Ok(TransactionCreateResponse::from_record(&stored))
    }

    /// Fetches a transaction by store id or transaction number, enriched
    /// best-effort with the live notification status for flagged, notified
    /// records. Enrichment failure never fails the fetch.
    pub async fn fetch(&self, id: &str) -> Result<Option<TransactionDetailResponse>, AppError> {
        let Some(record) = self.store.fetch(id).await? else {
            return Ok(None);
        };

        let mut detail = TransactionDetailResponse::from_record(&record);

        if record.is_fraud && record.notification_sent {
            match self.notifier.check_status(&record.transaction_number).await {
                NotificationStatusLookup::Found(status) => {
                    detail.notification_status = Some(status);
                }
                NotificationStatusLookup::NotFound => {}
                NotificationStatusLookup::Unavailable { error } => {
                    tracing::warn!(
                        transaction_number = %record.transaction_number,
                        error = %error,
                        "notification status enrichment failed"
                    );
                }
            }
        }

        Ok(Some(detail))
    }

    /// Paginated listing with an optional exact-match status filter.
    pub async fn list(
        &self,
        page: i64,
        limit: i64,
        status: Option<TransactionStatus>,
    ) -> Result<PaginatedTransactions, AppError> {
        let result = self.store.list(page, limit, status).await?;

        Ok(PaginatedTransactions {
            success: true,
            transactions: result
                .transactions
                .iter()
                .map(TransactionDetailResponse::from_record)
                .collect(),
            page: result.page,
            limit: result.limit,
            total: result.total,
            pages: result.pages,
        })
    }
}

/// Server-generated transaction numbers: `txn_` plus 8 lowercase hex chars.
pub fn generate_transaction_number() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("txn_{}", &hex[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_numbers_match_the_txn_pattern() {
        for _ in 0..100 {
            let number = generate_transaction_number();
            let hex = number.strip_prefix("txn_").expect("txn_ prefix");
            assert_eq!(hex.len(), 8);
            assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn generated_numbers_do_not_collide_cheaply() {
        let numbers: HashSet<String> = (0..1000).map(|_| generate_transaction_number()).collect();
        assert_eq!(numbers.len(), 1000);
    }
}
