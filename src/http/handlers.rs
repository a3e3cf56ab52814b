//! Request handlers for the ledger endpoints.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::AppError;
use crate::domain::{
    Cents, TransactionId, TransactionKind, TransactionRecord, UserId, cents_to_units, parse_cents,
};

use super::{AppState, error::ApiError};

/// Request body for `POST /topup`.
#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    pub user_id: UserId,
    pub amount: serde_json::Number,
}

/// Request body for `POST /transfer`.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub amount: serde_json::Number,
}

/// Body of a successful money movement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// One entry of the transaction history response.
#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub id: TransactionId,
    pub user_id: UserId,
    /// Signed amount in currency units
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionRecord> for TransactionView {
    fn from(record: TransactionRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            amount: cents_to_units(record.amount),
            kind: record.kind,
            created_at: record.created_at,
        }
    }
}

/// Convert a JSON number such as `50`, `12.5` or `-3.0` into cents.
fn amount_to_cents(amount: &serde_json::Number) -> Result<Cents, ApiError> {
    parse_cents(&amount.to_string()).map_err(|e| ApiError::Ledger(AppError::from(e)))
}

/// POST /topup - Credit a user's balance.
pub async fn top_up(
    State(state): State<AppState>,
    payload: Result<Json<TopUpRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    let amount = amount_to_cents(&request.amount)?;

    state.ledger.top_up(request.user_id, amount).await?;

    Ok(Json(MessageResponse {
        message: "balance topped up",
    }))
}

/// POST /transfer - Move funds from one user to another.
pub async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    let amount = amount_to_cents(&request.amount)?;

    state
        .ledger
        .transfer(request.from_user_id, request.to_user_id, amount)
        .await?;

    Ok(Json(MessageResponse {
        message: "transfer success",
    }))
}

/// GET /transactions/{user_id} - List a user's most recent transactions.
pub async fn recent_transactions(
    State(state): State<AppState>,
    user_id: Result<Path<UserId>, PathRejection>,
) -> Result<Json<Vec<TransactionView>>, ApiError> {
    let Path(user_id) = user_id?;

    let records = state.ledger.recent_transactions(user_id).await?;

    Ok(Json(records.into_iter().map(TransactionView::from).collect()))
}
