//! Order lookup, notes, and return-window endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::Utc;
use common::OrderId;
use domain::{OrderDetails, ReturnWindow};
use ledger_store::{LedgerStore, Order, OrderNote};
use serde::Deserialize;

use super::{parse_id, required};
use crate::error::ApiError;
use crate::state::AppState;

// -- Request types --

#[derive(Deserialize)]
pub struct OrdersQuery {
    pub customer_email: Option<String>,
}

#[derive(Deserialize)]
pub struct AddNoteRequest {
    pub note: Option<String>,
    pub visibility: Option<String>,
}

// -- Handlers --

/// GET /orders?customer_email=...
#[tracing::instrument(skip(state, query))]
pub async fn list<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<OrdersQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let Query(query) = query?;
    let email = required(&query.customer_email)
        .ok_or_else(|| ApiError::bad_request("customer_email query parameter is required"))?;
    Ok(Json(state.orders.for_customer_email(email).await?))
}

/// GET /orders/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetails>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order id")?;
    Ok(Json(state.orders.details(order_id).await?))
}

/// POST /orders/{id}/notes
#[tracing::instrument(skip(state, payload))]
pub async fn add_note<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<AddNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderNote>), ApiError> {
    let Json(req) = payload?;
    let order_id: OrderId = parse_id(&id, "order id")?;

    let note = state
        .orders
        .add_note(
            order_id,
            req.note.as_deref().unwrap_or_default(),
            req.visibility.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /orders/{id}/return-window
#[tracing::instrument(skip(state))]
pub async fn return_window<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ReturnWindow>, ApiError> {
    let order_id: OrderId = parse_id(&id, "order id")?;
    Ok(Json(state.policies.return_window(order_id, Utc::now()).await?))
}
