//! Shipment tracking endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use common::{OrderId, ShipmentId};
use domain::{RecordedEvent, ShipmentWithEvents, TrackingDetails};
use ledger_store::LedgerStore;
use serde::Deserialize;

use super::parse_id;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RecordEventRequest {
    pub status: Option<String>,
    pub message: Option<String>,
    pub location: Option<String>,
}

/// GET /shipments/by-tracking/{tracking_id}
#[tracing::instrument(skip(state))]
pub async fn by_tracking<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(tracking_id): Path<String>,
) -> Result<Json<TrackingDetails>, ApiError> {
    Ok(Json(state.shipments.track(&tracking_id).await?))
}

/// GET /shipments/by-order/{order_id}
#[tracing::instrument(skip(state))]
pub async fn by_order<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(order_id): Path<String>,
) -> Result<Json<Vec<ShipmentWithEvents>>, ApiError> {
    let order_id: OrderId = parse_id(&order_id, "order_id")?;
    Ok(Json(state.shipments.for_order(order_id).await?))
}

/// POST /shipments/{id}/events
#[tracing::instrument(skip(state, payload))]
pub async fn record_event<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<RecordEventRequest>, JsonRejection>,
) -> Result<Json<RecordedEvent>, ApiError> {
    let Json(req) = payload?;
    let shipment_id: ShipmentId = parse_id(&id, "shipment id")?;

    let recorded = state
        .shipments
        .record_event(
            shipment_id,
            req.status.as_deref().unwrap_or_default(),
            req.message.as_deref().unwrap_or_default(),
            req.location.as_deref(),
        )
        .await?;
    Ok(Json(recorded))
}
