use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use ledger_store::{LedgerStore, Policy};
use serde::Deserialize;

use super::required;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct PolicyQuery {
    pub country: Option<String>,
}

/// GET /policies?country=XX
#[tracing::instrument(skip(state, query))]
pub async fn get<S: LedgerStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<PolicyQuery>, QueryRejection>,
) -> Result<Json<Policy>, ApiError> {
    let Query(query) = query?;
    let country = required(&query.country)
        .ok_or_else(|| ApiError::bad_request("country query parameter is required"))?;
    Ok(Json(state.policies.lookup(country).await?))
}
