//! Inventory reservation engine.
//!
//! Moves stock between the available and reserved pools of an
//! [`InventoryItem`]. Each reserve or release is one unit of work holding the
//! item update (conditional on the version it was read at) together with the
//! reservation write, so concurrent callers on one SKU serialize through the
//! item's version while different SKUs never contend.

use chrono::Utc;
use common::{ReservationId, Sku};
use ledger_store::{InventoryItem, LedgerStore, Reservation, UnitOfWork, Versioned};
use serde::Serialize;

use crate::error::{DomainError, Result};
use crate::retry::retry_on_conflict;

/// Current stock for a SKU with the holds against it.
#[derive(Debug, Clone, Serialize)]
pub struct StockView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub active_reservations: Vec<Reservation>,
    /// True once available stock has fallen to the reorder threshold.
    pub needs_reorder: bool,
}

/// Result of a reserve or release: the reservation together with the item
/// exactly as the same unit of work left it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationOutcome {
    pub inventory: InventoryItem,
    pub reservation: Reservation,
}

/// Cross-check of an item's reserved pool against its active reservations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerAudit {
    pub sku: Sku,
    pub available_qty: i64,
    pub reserved_qty: i64,
    pub active_reservation_count: usize,
    pub active_reservation_qty: i64,
    pub consistent: bool,
}

/// Service for reserving and releasing stock.
#[derive(Clone)]
pub struct InventoryService<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> InventoryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Holds `qty` units of `sku`.
    ///
    /// Fails with `InsufficientInventory` when fewer than `qty` units are
    /// available; the error carries the available quantity seen.
    #[tracing::instrument(skip(self))]
    pub async fn reserve(&self, sku: &Sku, qty: i64, reason: &str) -> Result<ReservationOutcome> {
        if qty <= 0 {
            return Err(DomainError::validation("qty must be greater than 0"));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(DomainError::validation("reason is required"));
        }

        let outcome =
            retry_on_conflict("reserve", move || self.try_reserve(sku, qty, reason)).await?;

        metrics::counter!("inventory_reservations_created_total").increment(1);
        tracing::info!(reservation_id = %outcome.reservation.id, "Reserved {qty} units of {sku}");
        Ok(outcome)
    }

    async fn try_reserve(&self, sku: &Sku, qty: i64, reason: &str) -> Result<ReservationOutcome> {
        let Versioned { record: mut item, version } = self.load_item(sku).await?;

        if item.available_qty < qty {
            metrics::counter!("inventory_insufficient_total").increment(1);
            return Err(DomainError::InsufficientInventory {
                sku: sku.clone(),
                requested: qty,
                available: item.available_qty,
            });
        }

        let now = Utc::now();
        item.available_qty -= qty;
        item.reserved_qty += qty;
        item.updated_at = now;

        let reservation = Reservation {
            id: ReservationId::new(),
            sku: sku.clone(),
            qty,
            reason: reason.to_string(),
            created_at: now,
            released_at: None,
        };

        self.store
            .commit(
                UnitOfWork::new()
                    .update(item.clone(), version)
                    .insert(reservation.clone()),
            )
            .await?;

        Ok(ReservationOutcome {
            inventory: item,
            reservation,
        })
    }

    /// Ends a reservation and returns its units to the available pool.
    ///
    /// A reservation can be released once; later calls fail with
    /// `AlreadyReleased` and leave the counters untouched.
    #[tracing::instrument(skip(self))]
    pub async fn release(&self, reservation_id: ReservationId) -> Result<ReservationOutcome> {
        let outcome =
            retry_on_conflict("release", move || self.try_release(reservation_id)).await?;

        metrics::counter!("inventory_reservations_released_total").increment(1);
        tracing::info!(
            sku = %outcome.reservation.sku,
            qty = outcome.reservation.qty,
            "Released reservation"
        );
        Ok(outcome)
    }

    async fn try_release(&self, reservation_id: ReservationId) -> Result<ReservationOutcome> {
        let Versioned {
            record: mut reservation,
            version: reservation_version,
        } = self
            .store
            .reservation(reservation_id)
            .await?
            .ok_or(DomainError::NotFound("Reservation not found"))?;

        if !reservation.is_active() {
            return Err(DomainError::AlreadyReleased { reservation_id });
        }

        let Versioned { record: mut item, version: item_version } =
            self.load_item(&reservation.sku).await?;

        let now = Utc::now();
        item.available_qty += reservation.qty;
        item.reserved_qty -= reservation.qty;
        item.updated_at = now;
        reservation.released_at = Some(now);

        self.store
            .commit(
                UnitOfWork::new()
                    .update(item.clone(), item_version)
                    .update(reservation.clone(), reservation_version),
            )
            .await?;

        Ok(ReservationOutcome {
            inventory: item,
            reservation,
        })
    }

    /// Lists every stocked item ordered by SKU.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<InventoryItem>> {
        Ok(self.store.inventory_items().await?)
    }

    /// Returns the stock levels of a SKU and its active holds.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, sku: &Sku) -> Result<StockView> {
        let item = self.load_item(sku).await?.into_record();
        let active_reservations = self.store.active_reservations(sku).await?;
        let needs_reorder = item.available_qty <= item.reorder_threshold;

        Ok(StockView {
            item,
            active_reservations,
            needs_reorder,
        })
    }

    /// Recomputes the reserved pool of a SKU from its active reservations.
    #[tracing::instrument(skip(self))]
    pub async fn audit(&self, sku: &Sku) -> Result<LedgerAudit> {
        let item = self.load_item(sku).await?.into_record();
        let active = self.store.active_reservations(sku).await?;
        let active_reservation_qty: i64 = active.iter().map(|r| r.qty).sum();

        let consistent = item.available_qty >= 0
            && item.reserved_qty >= 0
            && item.reserved_qty == active_reservation_qty;
        if !consistent {
            tracing::warn!(
                %sku,
                reserved_qty = item.reserved_qty,
                active_reservation_qty,
                "Reserved pool does not match active reservations"
            );
        }

        Ok(LedgerAudit {
            sku: item.sku,
            available_qty: item.available_qty,
            reserved_qty: item.reserved_qty,
            active_reservation_count: active.len(),
            active_reservation_qty,
            consistent,
        })
    }

    async fn load_item(&self, sku: &Sku) -> Result<Versioned<InventoryItem>> {
        self.store
            .inventory_item(sku)
            .await?
            .ok_or(DomainError::NotFound("Inventory item not found"))
    }
}

#[cfg(test)]
mod tests {
    use ledger_store::{InMemoryLedgerStore, LedgerStoreExt};

    use super::*;

    async fn service_with(sku: &str, available: i64) -> InventoryService<InMemoryLedgerStore> {
        let store = InMemoryLedgerStore::new();
        store
            .insert(InventoryItem::new(sku, "Test Item", available).with_reorder_threshold(5))
            .await
            .unwrap();
        InventoryService::new(store)
    }

    #[tokio::test]
    async fn reserve_moves_stock_to_reserved_pool() {
        let service = service_with("LAPTOP-X1", 50).await;
        let sku = Sku::new("LAPTOP-X1");

        let outcome = service.reserve(&sku, 3, "replacement").await.unwrap();
        let reservation = outcome.reservation;
        assert_eq!(reservation.qty, 3);
        assert_eq!(outcome.inventory.available_qty, 47);
        assert_eq!(outcome.inventory.reserved_qty, 3);
        assert!(reservation.is_active());

        let view = service.get(&sku).await.unwrap();
        assert_eq!(view.item.available_qty, 47);
        assert_eq!(view.item.reserved_qty, 3);
        assert_eq!(view.active_reservations, vec![reservation]);
        assert!(!view.needs_reorder);
    }

    #[tokio::test]
    async fn reserve_validates_before_lookup() {
        let service = service_with("LAPTOP-X1", 50).await;
        let unknown = Sku::new("UNKNOWN");

        assert!(matches!(
            service.reserve(&unknown, 0, "replacement").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.reserve(&unknown, 1, "   ").await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            service.reserve(&unknown, 1, "replacement").await,
            Err(DomainError::NotFound("Inventory item not found"))
        ));
    }

    #[tokio::test]
    async fn insufficient_stock_changes_nothing() {
        let service = service_with("HEADSET-Z3", 0).await;
        let sku = Sku::new("HEADSET-Z3");

        let err = service.reserve(&sku, 1, "replacement").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientInventory { available: 0, requested: 1, .. }
        ));
        assert_eq!(err.to_string(), "Only 0 units available");

        let view = service.get(&sku).await.unwrap();
        assert_eq!(view.item.available_qty, 0);
        assert!(view.active_reservations.is_empty());
        assert!(view.needs_reorder);
    }

    #[tokio::test]
    async fn release_is_one_shot() {
        let service = service_with("MOUSE-M4", 10).await;
        let sku = Sku::new("MOUSE-M4");
        let reservation = service.reserve(&sku, 4, "hold").await.unwrap().reservation;

        let released = service.release(reservation.id).await.unwrap();
        assert!(released.reservation.released_at.is_some());
        assert_eq!(released.inventory.available_qty, 10);
        assert_eq!(released.inventory.reserved_qty, 0);

        let again = service.release(reservation.id).await;
        assert!(matches!(again, Err(DomainError::AlreadyReleased { .. })));

        let view = service.get(&sku).await.unwrap();
        assert_eq!(view.item.available_qty, 10);
        assert_eq!(view.item.reserved_qty, 0);
    }

    #[tokio::test]
    async fn release_of_unknown_reservation_is_not_found() {
        let service = service_with("MOUSE-M4", 10).await;
        assert!(matches!(
            service.release(ReservationId::new()).await,
            Err(DomainError::NotFound("Reservation not found"))
        ));
    }

    #[tokio::test]
    async fn audit_matches_active_reservations() {
        let service = service_with("CABLE-C7", 500).await;
        let sku = Sku::new("CABLE-C7");
        let first = service.reserve(&sku, 20, "bulk order").await.unwrap().reservation;
        service.reserve(&sku, 5, "replacement").await.unwrap();
        service.release(first.id).await.unwrap();

        let audit = service.audit(&sku).await.unwrap();
        assert_eq!(audit.active_reservation_count, 1);
        assert_eq!(audit.active_reservation_qty, 5);
        assert_eq!(audit.reserved_qty, 5);
        assert_eq!(audit.available_qty, 495);
        assert!(audit.consistent);
    }

    #[tokio::test]
    async fn outcome_reports_the_committed_item_not_a_later_one() {
        let service = service_with("PHONE-Y2", 10).await;
        let sku = Sku::new("PHONE-Y2");

        let first = service.reserve(&sku, 2, "hold").await.unwrap();
        let second = service.reserve(&sku, 3, "hold").await.unwrap();
        assert_eq!(first.inventory.available_qty, 8);
        assert_eq!(second.inventory.available_qty, 5);

        let released = service.release(first.reservation.id).await.unwrap();
        assert_eq!(released.inventory.available_qty, 7);
        assert_eq!(released.inventory.reserved_qty, 3);
        assert_eq!(released.inventory, service.get(&sku).await.unwrap().item);
    }

    #[tokio::test]
    async fn list_is_ordered_by_sku() {
        let service = service_with("MOUSE-M4", 10).await;
        service
            .store
            .insert(InventoryItem::new("CABLE-C7", "Cable", 500))
            .await
            .unwrap();
        let reservation = service
            .reserve(&Sku::new("MOUSE-M4"), 4, "hold")
            .await
            .unwrap();

        let items = service.list().await.unwrap();
        let skus: Vec<&str> = items.iter().map(|item| item.sku.as_str()).collect();
        assert_eq!(skus, ["CABLE-C7", "MOUSE-M4"]);
        assert_eq!(items[1], reservation.inventory);
    }
}
