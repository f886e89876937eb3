//! Return and refund lifecycle.
//!
//! `requested -> approved -> received -> refunded`. Approval may be skipped on
//! the way to `received`, but a refund always follows approval or receipt.
//! Refund windows are not consulted here; see [`crate::policy`].

use chrono::Utc;
use common::{OrderId, ReturnId, ReturnReason, ReturnStatus};
use ledger_store::{LedgerStore, ReturnRequest, UnitOfWork, Versioned};

use crate::error::{DomainError, Result};
use crate::retry::retry_on_conflict;

/// A transition of the return lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnAction {
    Approve,
    Receive,
    Refund,
}

impl ReturnAction {
    /// Statuses the action may start from.
    pub fn allowed_from(&self) -> &'static [ReturnStatus] {
        match self {
            ReturnAction::Approve => &[ReturnStatus::Requested],
            ReturnAction::Receive => &[ReturnStatus::Requested, ReturnStatus::Approved],
            ReturnAction::Refund => &[ReturnStatus::Approved, ReturnStatus::Received],
        }
    }

    /// Status the return ends up in.
    pub fn target(&self) -> ReturnStatus {
        match self {
            ReturnAction::Approve => ReturnStatus::Approved,
            ReturnAction::Receive => ReturnStatus::Received,
            ReturnAction::Refund => ReturnStatus::Refunded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnAction::Approve => "approve",
            ReturnAction::Receive => "receive",
            ReturnAction::Refund => "refund",
        }
    }

    /// Applies the action to `request` in place.
    pub fn apply(&self, request: &mut ReturnRequest) -> Result<()> {
        if !self.allowed_from().contains(&request.status) {
            return Err(DomainError::InvalidStatus {
                action: *self,
                status: request.status,
            });
        }

        request.status = self.target();
        if request.status == ReturnStatus::Refunded {
            request.resolved_at = Some(Utc::now());
        }
        Ok(())
    }
}

impl std::fmt::Display for ReturnAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct ReturnService<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> ReturnService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Opens a return against an order in `requested` status.
    #[tracing::instrument(skip(self))]
    pub async fn create(
        &self,
        order_id: OrderId,
        reason_code: &str,
        details: Option<&str>,
    ) -> Result<ReturnRequest> {
        let reason_code: ReturnReason = reason_code
            .trim()
            .parse()
            .map_err(|e: common::ParseEnumError| DomainError::validation(e.to_string()))?;

        if self.store.order(order_id).await?.is_none() {
            return Err(DomainError::NotFound("Order not found"));
        }

        let request = ReturnRequest {
            id: ReturnId::new(),
            order_id,
            reason_code,
            details: details
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            status: ReturnStatus::Requested,
            requested_at: Utc::now(),
            resolved_at: None,
        };
        self.store
            .commit(UnitOfWork::new().insert(request.clone()))
            .await?;

        metrics::counter!("return_transitions_total", "status" => ReturnStatus::Requested.as_str())
            .increment(1);
        tracing::info!(return_id = %request.id, %reason_code, "Return requested");
        Ok(request)
    }

    #[tracing::instrument(skip(self))]
    pub async fn approve(&self, return_id: ReturnId) -> Result<ReturnRequest> {
        self.transition(return_id, ReturnAction::Approve).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn receive(&self, return_id: ReturnId) -> Result<ReturnRequest> {
        self.transition(return_id, ReturnAction::Receive).await
    }

    /// Marks the return refunded and stamps `resolved_at`.
    #[tracing::instrument(skip(self))]
    pub async fn refund(&self, return_id: ReturnId) -> Result<ReturnRequest> {
        self.transition(return_id, ReturnAction::Refund).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, return_id: ReturnId) -> Result<ReturnRequest> {
        Ok(self.load(return_id).await?.into_record())
    }

    async fn transition(&self, return_id: ReturnId, action: ReturnAction) -> Result<ReturnRequest> {
        let request = retry_on_conflict(action.as_str(), move || {
            self.try_transition(return_id, action)
        })
        .await?;

        metrics::counter!("return_transitions_total", "status" => request.status.as_str())
            .increment(1);
        tracing::info!(%return_id, status = %request.status, "Return transitioned");
        Ok(request)
    }

    async fn try_transition(
        &self,
        return_id: ReturnId,
        action: ReturnAction,
    ) -> Result<ReturnRequest> {
        let Versioned { record: mut request, version } = self.load(return_id).await?;
        action.apply(&mut request)?;

        self.store
            .commit(UnitOfWork::new().update(request.clone(), version))
            .await?;
        Ok(request)
    }

    async fn load(&self, return_id: ReturnId) -> Result<Versioned<ReturnRequest>> {
        self.store
            .return_request(return_id)
            .await?
            .ok_or(DomainError::NotFound("Return not found"))
    }
}
