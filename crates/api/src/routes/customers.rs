use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use common::CustomerId;
use ledger_store::{Customer, LedgerStore};
use serde::Deserialize;

use super::{parse_id, required};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CustomerQuery {
    pub email: Option<String>,
}

/// GET /customers?email=...
#[tracing::instrument(skip(state, query))]
pub async fn by_email<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<CustomerQuery>, QueryRejection>,
) -> Result<Json<Customer>, ApiError> {
    let Query(query) = query?;
    let email = required(&query.email)
        .ok_or_else(|| ApiError::bad_request("Email query parameter is required"))?;
    Ok(Json(state.orders.customer_by_email(email).await?))
}

/// GET /customers/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    let customer_id: CustomerId = parse_id(&id, "customer id")?;
    Ok(Json(state.orders.customer(customer_id).await?))
}
