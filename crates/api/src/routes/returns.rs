//! Return lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{OrderId, ReturnId};
use domain::ReturnAction;
use ledger_store::{LedgerStore, ReturnRequest};
use serde::Deserialize;

use super::{parse_id, required};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateReturnRequest {
    pub order_id: Option<String>,
    pub reason_code: Option<String>,
    pub details: Option<String>,
}

/// POST /returns
#[tracing::instrument(skip(state, payload))]
pub async fn create<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<CreateReturnRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReturnRequest>), ApiError> {
    let Json(req) = payload?;
    let (Some(order_id), Some(reason_code)) = (required(&req.order_id), required(&req.reason_code))
    else {
        return Err(ApiError::bad_request("order_id and reason_code are required"));
    };
    let order_id: OrderId = parse_id(order_id, "order_id")?;

    let request = state
        .returns
        .create(order_id, reason_code, req.details.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /returns/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ReturnRequest>, ApiError> {
    let return_id: ReturnId = parse_id(&id, "return id")?;
    Ok(Json(state.returns.get(return_id).await?))
}

pub async fn approve<S: LedgerStore + Clone + 'static>(
    state: State<Arc<AppState<S>>>,
    id: Path<String>,
) -> Result<Json<ReturnRequest>, ApiError> {
    transition(state, id, ReturnAction::Approve).await
}

pub async fn receive<S: LedgerStore + Clone + 'static>(
    state: State<Arc<AppState<S>>>,
    id: Path<String>,
) -> Result<Json<ReturnRequest>, ApiError> {
    transition(state, id, ReturnAction::Receive).await
}

pub async fn refund<S: LedgerStore + Clone + 'static>(
    state: State<Arc<AppState<S>>>,
    id: Path<String>,
) -> Result<Json<ReturnRequest>, ApiError> {
    transition(state, id, ReturnAction::Refund).await
}

#[tracing::instrument(skip(state))]
async fn transition<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    action: ReturnAction,
) -> Result<Json<ReturnRequest>, ApiError> {
    let return_id: ReturnId = parse_id(&id, "return id")?;
    let request = match action {
        ReturnAction::Approve => state.returns.approve(return_id).await?,
        ReturnAction::Receive => state.returns.receive(return_id).await?,
        ReturnAction::Refund => state.returns.refund(return_id).await?,
    };
    Ok(Json(request))
}
