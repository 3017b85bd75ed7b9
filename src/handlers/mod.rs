pub mod transactions;

use axum::{Json, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

/// Liveness only, no dependency checks.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "Credit Card Transaction Service",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "timestamp": Utc::now().to_rfc3339(),
        "endpoints": {
            "create_transaction": "/transactions/create",
            "get_transaction": "/transactions/{id}",
            "list_transactions": "/transactions/",
            "health": "/health",
        },
    }))
}
