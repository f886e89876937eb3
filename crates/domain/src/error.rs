//! Domain error types.

use common::{ReservationId, ReturnStatus, Sku};
use ledger_store::LedgerStoreError;
use thiserror::Error;

use crate::returns::ReturnAction;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced record does not exist.
    #[error("{0}")]
    NotFound(&'static str),

    /// Malformed input.
    #[error("{0}")]
    Validation(String),

    /// Not enough available stock to satisfy a reservation.
    #[error("Only {available} units available")]
    InsufficientInventory {
        sku: Sku,
        requested: i64,
        available: i64,
    },

    /// The reservation has already been released.
    #[error("Reservation already released")]
    AlreadyReleased { reservation_id: ReservationId },

    /// The return is not in a status the action may start from.
    #[error("Cannot {action} return with status: {status}{}", status_hint(.action))]
    InvalidStatus {
        action: ReturnAction,
        status: ReturnStatus,
    },

    /// An error occurred in the ledger store.
    #[error("Ledger store error: {0}")]
    Store(#[from] LedgerStoreError),
}

fn status_hint(action: &ReturnAction) -> &'static str {
    match action {
        ReturnAction::Refund => ". Must be approved or received.",
        ReturnAction::Approve | ReturnAction::Receive => "",
    }
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    /// Machine-readable error code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "NOT_FOUND",
            DomainError::Validation(_) => "BAD_REQUEST",
            DomainError::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
            DomainError::AlreadyReleased { .. } => "ALREADY_RELEASED",
            DomainError::InvalidStatus { .. } => "INVALID_STATUS",
            DomainError::Store(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the whole operation may be re-run from a fresh read.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DomainError::Store(e) if e.is_conflict())
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_inventory_reports_available_quantity() {
        let err = DomainError::InsufficientInventory {
            sku: Sku::new("HEADSET-Z3"),
            requested: 1,
            available: 0,
        };
        assert_eq!(err.to_string(), "Only 0 units available");
        assert_eq!(err.code(), "INSUFFICIENT_INVENTORY");
    }

    #[test]
    fn invalid_status_messages() {
        let approve = DomainError::InvalidStatus {
            action: ReturnAction::Approve,
            status: ReturnStatus::Refunded,
        };
        assert_eq!(
            approve.to_string(),
            "Cannot approve return with status: refunded"
        );

        let refund = DomainError::InvalidStatus {
            action: ReturnAction::Refund,
            status: ReturnStatus::Requested,
        };
        assert_eq!(
            refund.to_string(),
            "Cannot refund return with status: requested. Must be approved or received."
        );
    }

    #[test]
    fn store_conflicts_are_detected() {
        let err = DomainError::from(LedgerStoreError::ConcurrencyConflict {
            collection: "inventory",
            key: "MOUSE-M4".to_string(),
            expected: ledger_store::Version::first(),
            actual: ledger_store::Version::new(2),
        });
        assert!(err.is_conflict());
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(!DomainError::NotFound("Return not found").is_conflict());
    }
}
