//! Order and customer lookups, and order notes.

use chrono::Utc;
use common::{CustomerId, NoteId, NoteVisibility, OrderId};
use ledger_store::{Customer, LedgerStore, Order, OrderNote, ReturnRequest, UnitOfWork};
use serde::Serialize;

use crate::error::{DomainError, Result};
use crate::shipment::{ShipmentService, ShipmentWithEvents};

/// Everything known about one order.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub customer: Customer,
    pub notes: Vec<OrderNote>,
    pub shipments: Vec<ShipmentWithEvents>,
    pub returns: Vec<ReturnRequest>,
}

#[derive(Clone)]
pub struct OrderService<S: LedgerStore> {
    store: S,
    shipments: ShipmentService<S>,
}

impl<S: LedgerStore + Clone> OrderService<S> {
    pub fn new(store: S) -> Self {
        Self {
            shipments: ShipmentService::new(store.clone()),
            store,
        }
    }
}

impl<S: LedgerStore> OrderService<S> {
    /// Loads an order with its customer, notes, shipments and returns.
    #[tracing::instrument(skip(self))]
    pub async fn details(&self, order_id: OrderId) -> Result<OrderDetails> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(DomainError::NotFound("Order not found"))?
            .into_record();
        let customer = self.customer(order.customer_id).await?;
        let notes = self.store.order_notes(order_id).await?;
        let shipments = self.shipments.with_events(order_id).await?;
        let returns = self.store.returns_for_order(order_id).await?;

        Ok(OrderDetails {
            order,
            customer,
            notes,
            shipments,
            returns,
        })
    }

    /// Lists a customer's orders, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn for_customer_email(&self, email: &str) -> Result<Vec<Order>> {
        let customer = self.customer_by_email(email).await?;
        Ok(self.store.orders_for_customer(customer.id).await?)
    }

    /// Attaches a note to an order.
    #[tracing::instrument(skip(self, note))]
    pub async fn add_note(
        &self,
        order_id: OrderId,
        note: &str,
        visibility: &str,
    ) -> Result<OrderNote> {
        let note = note.trim();
        if note.is_empty() || visibility.trim().is_empty() {
            return Err(DomainError::validation("note and visibility are required"));
        }
        let visibility: NoteVisibility = visibility
            .trim()
            .parse()
            .map_err(|_| DomainError::validation(r#"visibility must be "internal" or "public""#))?;

        if self.store.order(order_id).await?.is_none() {
            return Err(DomainError::NotFound("Order not found"));
        }

        let note = OrderNote {
            id: NoteId::new(),
            order_id,
            note: note.to_string(),
            visibility,
            created_at: Utc::now(),
        };
        self.store
            .commit(UnitOfWork::new().insert(note.clone()))
            .await?;

        tracing::info!(note_id = %note.id, %visibility, "Added order note");
        Ok(note)
    }

    #[tracing::instrument(skip(self))]
    pub async fn customer(&self, customer_id: CustomerId) -> Result<Customer> {
        self.store
            .customer(customer_id)
            .await?
            .ok_or(DomainError::NotFound("Customer not found"))
    }

    #[tracing::instrument(skip(self))]
    pub async fn customer_by_email(&self, email: &str) -> Result<Customer> {
        let email = email.trim();
        if email.is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        self.store
            .customer_by_email(email)
            .await?
            .ok_or(DomainError::NotFound("Customer not found"))
    }
}

#[cfg(test)]
mod tests {
    use common::{CountryCode, Money, OrderStatus};
    use ledger_store::{InMemoryLedgerStore, OrderItem};

    use super::*;

    async fn seeded() -> (OrderService<InMemoryLedgerStore>, Customer, Order) {
        let store = InMemoryLedgerStore::new();
        let customer = Customer {
            id: CustomerId::new(),
            email: "marco.rossi@example.it".to_string(),
            name: "Marco Rossi".to_string(),
            country_code: CountryCode::new("IT"),
            tags: vec![],
            created_at: Utc::now(),
        };
        let items = vec![OrderItem::new("PHONE-Y2", "Smartphone Y2", 1, Money::from_cents(79900))];
        let order = Order {
            id: OrderId::new(),
            customer_id: customer.id,
            status: OrderStatus::Created,
            total_amount: items.iter().map(OrderItem::total_price).sum(),
            currency: "EUR".to_string(),
            items,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            delivered_at: None,
        };
        store
            .commit(
                UnitOfWork::new()
                    .insert(customer.clone())
                    .insert(order.clone()),
            )
            .await
            .unwrap();
        (OrderService::new(store), customer, order)
    }

    #[tokio::test]
    async fn details_include_notes() {
        let (service, customer, order) = seeded().await;
        service
            .add_note(order.id, "Customer called about delivery", "internal")
            .await
            .unwrap();

        let details = service.details(order.id).await.unwrap();
        assert_eq!(details.customer.id, customer.id);
        assert_eq!(details.notes.len(), 1);
        assert_eq!(details.notes[0].visibility, NoteVisibility::Internal);
        assert!(details.shipments.is_empty());
    }

    #[tokio::test]
    async fn note_visibility_is_validated() {
        let (service, _, order) = seeded().await;
        let err = service
            .add_note(order.id, "hello", "secret")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), r#"visibility must be "internal" or "public""#);
    }

    #[tokio::test]
    async fn orders_by_customer_email() {
        let (service, _, order) = seeded().await;
        let orders = service
            .for_customer_email("marco.rossi@example.it")
            .await
            .unwrap();
        assert_eq!(orders, vec![order]);

        assert!(matches!(
            service.for_customer_email("nobody@example.com").await,
            Err(DomainError::NotFound("Customer not found"))
        ));
    }
}
