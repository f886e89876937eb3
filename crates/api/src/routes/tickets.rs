//! Operations ticket endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::TicketId;
use ledger_store::{LedgerStore, Ticket};
use serde::Deserialize;

use super::{parse_id, required};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateTicketRequest {
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub priority: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
}

/// POST /tickets
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let Json(req) = payload?;
    let (Some(ticket_type), Some(priority), Some(title), Some(body)) = (
        required(&req.ticket_type),
        required(&req.priority),
        required(&req.title),
        required(&req.body),
    ) else {
        return Err(ApiError::bad_request(
            "type, priority, title, and body are required",
        ));
    };

    let ticket = state
        .tickets
        .create(ticket_type, priority, title, body)
        .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /tickets/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket_id: TicketId = parse_id(&id, "ticket id")?;
    Ok(Json(state.tickets.get(ticket_id).await?))
}
