pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod schemas;
pub mod services;
pub mod validation;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use crate::services::TransactionWorkflow;

#[derive(Clone)]
pub struct AppState {
    pub workflow: TransactionWorkflow,
}

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/transactions/create",
            post(handlers::transactions::create_transaction),
        )
        .route(
            "/transactions/",
            get(handlers::transactions::list_transactions),
        )
        .route(
            "/transactions/:id",
            get(handlers::transactions::get_transaction),
        )
        .layer(cors)
        .with_state(state)
}
