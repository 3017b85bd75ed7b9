use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::AppError;
use crate::schemas::CreateTransactionRequest;
use crate::validation;

pub async fn create_transaction(
    State(state): State<AppState>,
    Json(payload): Json<CreateTransactionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_positive_amount(payload.transaction_amount)?;

    let created = state.workflow.process(payload).await?;
    Ok(Json(created))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    match state.workflow.fetch(&id).await? {
        Some(detail) => Ok(Json(detail)),
        None => Err(AppError::NotFound(id)),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(10);
    validation::validate_page(page)?;
    validation::validate_limit(limit)?;

    let status = query
        .status
        .as_deref()
        .map(validation::parse_status_filter)
        .transpose()?;

    let result = state.workflow.list(page, limit, status).await?;
    Ok(Json(result))
}
