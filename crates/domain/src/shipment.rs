//! Shipment tracking.
//!
//! The event log is the source of truth; a shipment's `status` and
//! `last_update_at` are rewritten in the same unit of work that appends each
//! event and always mirror the newest one. No transition is rejected based on
//! the prior status since carrier feeds report out of order.

use chrono::Utc;
use common::{OrderId, ShipmentEventId, ShipmentId, ShipmentStatus};
use ledger_store::{LedgerStore, Order, Shipment, ShipmentEvent, UnitOfWork, Versioned};
use serde::Serialize;

use crate::error::{DomainError, Result};
use crate::retry::retry_on_conflict;

/// Result of appending a tracking event.
#[derive(Debug, Clone, Serialize)]
pub struct RecordedEvent {
    pub shipment: Shipment,
    pub event: ShipmentEvent,
}

/// A shipment with its tracking log, newest event first.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentWithEvents {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub events: Vec<ShipmentEvent>,
}

/// Answer to a tracking-number lookup.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingDetails {
    #[serde(flatten)]
    pub shipment: Shipment,
    pub events: Vec<ShipmentEvent>,
    pub order: Order,
}

#[derive(Clone)]
pub struct ShipmentService<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> ShipmentService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends a tracking event and moves the shipment to its status.
    ///
    /// `status` must be one of the six shipment statuses and `message` must
    /// not be blank. The event is stamped with the current time.
    #[tracing::instrument(skip(self))]
    pub async fn record_event(
        &self,
        shipment_id: ShipmentId,
        status: &str,
        message: &str,
        location: Option<&str>,
    ) -> Result<RecordedEvent> {
        let message = message.trim();
        if status.trim().is_empty() || message.is_empty() {
            return Err(DomainError::validation("status and message are required"));
        }
        let status: ShipmentStatus = status
            .trim()
            .parse()
            .map_err(|e: common::ParseEnumError| DomainError::validation(e.to_string()))?;
        let location = location.map(str::trim).filter(|l| !l.is_empty());

        let recorded = retry_on_conflict("record_shipment_event", move || {
            self.try_record_event(shipment_id, status, message, location)
        })
        .await?;

        metrics::counter!("shipment_events_recorded_total", "status" => status.as_str())
            .increment(1);
        tracing::info!(
            tracking_id = %recorded.shipment.tracking_id,
            %status,
            "Recorded shipment event"
        );
        Ok(recorded)
    }

    async fn try_record_event(
        &self,
        shipment_id: ShipmentId,
        status: ShipmentStatus,
        message: &str,
        location: Option<&str>,
    ) -> Result<RecordedEvent> {
        let Versioned { record: mut shipment, version } = self
            .store
            .shipment(shipment_id)
            .await?
            .ok_or(DomainError::NotFound("Shipment not found"))?;

        let now = Utc::now();
        let event = ShipmentEvent {
            id: ShipmentEventId::new(),
            shipment_id,
            event_time: now,
            location: location.map(str::to_string),
            status,
            message: message.to_string(),
        };
        shipment.status = status;
        shipment.last_update_at = now;

        self.store
            .commit(
                UnitOfWork::new()
                    .update(shipment.clone(), version)
                    .insert(event.clone()),
            )
            .await?;

        Ok(RecordedEvent { shipment, event })
    }

    /// Looks a shipment up by carrier tracking id.
    #[tracing::instrument(skip(self))]
    pub async fn track(&self, tracking_id: &str) -> Result<TrackingDetails> {
        let shipment = self
            .store
            .shipment_by_tracking_id(tracking_id.trim())
            .await?
            .ok_or(DomainError::NotFound("Shipment not found"))?
            .into_record();

        let events = self.store.shipment_events(shipment.id).await?;
        let order = self
            .store
            .order(shipment.order_id)
            .await?
            .ok_or(DomainError::NotFound("Order not found"))?
            .into_record();

        Ok(TrackingDetails {
            shipment,
            events,
            order,
        })
    }

    /// Lists every shipment of an order with its tracking log.
    #[tracing::instrument(skip(self))]
    pub async fn for_order(&self, order_id: OrderId) -> Result<Vec<ShipmentWithEvents>> {
        let shipments = self.with_events(order_id).await?;
        if shipments.is_empty() {
            return Err(DomainError::NotFound("No shipments found for this order"));
        }
        Ok(shipments)
    }

    /// Like [`for_order`](Self::for_order) but an order without shipments
    /// yields an empty list.
    pub(crate) async fn with_events(&self, order_id: OrderId) -> Result<Vec<ShipmentWithEvents>> {
        let mut result = Vec::new();
        for shipment in self.store.shipments_for_order(order_id).await? {
            let events = self.store.shipment_events(shipment.id).await?;
            result.push(ShipmentWithEvents { shipment, events });
        }
        Ok(result)
    }
}
