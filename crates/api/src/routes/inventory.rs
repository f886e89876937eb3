//! Stock lookup and reservation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use common::{ReservationId, Sku};
use domain::{LedgerAudit, ReservationOutcome, StockView};
use ledger_store::{InventoryItem, LedgerStore};
use serde::Deserialize;

use super::{parse_id, required};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ReserveRequest {
    pub sku: Option<String>,
    pub qty: Option<i64>,
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct ReleaseRequest {
    pub reservation_id: Option<String>,
}

/// GET /inventory
#[tracing::instrument(skip(state))]
pub async fn list<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    Ok(Json(state.inventory.list().await?))
}

/// GET /inventory/{sku}
#[tracing::instrument(skip(state))]
pub async fn get<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(sku): Path<String>,
) -> Result<Json<StockView>, ApiError> {
    Ok(Json(state.inventory.get(&Sku::new(sku)).await?))
}

/// GET /inventory/{sku}/audit
#[tracing::instrument(skip(state))]
pub async fn audit<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(sku): Path<String>,
) -> Result<Json<LedgerAudit>, ApiError> {
    Ok(Json(state.inventory.audit(&Sku::new(sku)).await?))
}

/// POST /inventory/reserve
#[tracing::instrument(skip(state, payload))]
pub async fn reserve<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ReserveRequest>, JsonRejection>,
) -> Result<Json<ReservationOutcome>, ApiError> {
    let Json(req) = payload?;
    let (Some(sku), Some(qty), Some(reason)) = (required(&req.sku), req.qty, req.reason.as_deref())
    else {
        return Err(ApiError::bad_request("sku, qty, and reason are required"));
    };

    let outcome = state.inventory.reserve(&Sku::new(sku), qty, reason).await?;
    Ok(Json(outcome))
}

/// POST /inventory/release
#[tracing::instrument(skip(state, payload))]
pub async fn release<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<ReleaseRequest>, JsonRejection>,
) -> Result<Json<ReservationOutcome>, ApiError> {
    let Json(req) = payload?;
    let raw_id = required(&req.reservation_id)
        .ok_or_else(|| ApiError::bad_request("reservation_id is required"))?;
    let reservation_id: ReservationId = parse_id(raw_id, "reservation_id")?;

    let outcome = state.inventory.release(reservation_id).await?;
    Ok(Json(outcome))
}
