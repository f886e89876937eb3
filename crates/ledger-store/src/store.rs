use async_trait::async_trait;
use common::{
    CountryCode, CustomerId, OrderId, ReservationId, ReturnId, ShipmentId, Sku, TicketId,
};

use crate::records::{
    Customer, InventoryItem, Order, OrderNote, Policy, Reservation, ReturnRequest, Shipment,
    ShipmentEvent, Ticket,
};
use crate::{Result, UnitOfWork, Versioned};

/// Core trait for ledger store implementations.
///
/// Reads return plain records; mutable records come wrapped in [`Versioned`]
/// so callers can make their writes conditional. All writes go through
/// [`commit`](LedgerStore::commit). All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Applies every mutation in the unit atomically - either all succeed or
    /// none do.
    ///
    /// Fails with `ConcurrencyConflict` if any update finds a version other
    /// than the one it expects.
    async fn commit(&self, unit: UnitOfWork) -> Result<()>;

    /// Retrieves an inventory item by SKU.
    async fn inventory_item(&self, sku: &Sku) -> Result<Option<Versioned<InventoryItem>>>;

    /// Lists all inventory items ordered by SKU.
    async fn inventory_items(&self) -> Result<Vec<InventoryItem>>;

    /// Retrieves a reservation by id.
    async fn reservation(&self, id: ReservationId) -> Result<Option<Versioned<Reservation>>>;

    /// Retrieves the unreleased reservations held against a SKU, oldest first.
    async fn active_reservations(&self, sku: &Sku) -> Result<Vec<Reservation>>;

    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    async fn customer_by_email(&self, email: &str) -> Result<Option<Customer>>;

    async fn order(&self, id: OrderId) -> Result<Option<Versioned<Order>>>;

    /// Retrieves a customer's orders, newest first.
    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>>;

    /// Retrieves the notes on an order, oldest first.
    async fn order_notes(&self, order_id: OrderId) -> Result<Vec<OrderNote>>;

    async fn shipment(&self, id: ShipmentId) -> Result<Option<Versioned<Shipment>>>;

    async fn shipment_by_tracking_id(
        &self,
        tracking_id: &str,
    ) -> Result<Option<Versioned<Shipment>>>;

    async fn shipments_for_order(&self, order_id: OrderId) -> Result<Vec<Shipment>>;

    /// Retrieves a shipment's tracking log, newest event first.
    async fn shipment_events(&self, shipment_id: ShipmentId) -> Result<Vec<ShipmentEvent>>;

    async fn return_request(&self, id: ReturnId) -> Result<Option<Versioned<ReturnRequest>>>;

    /// Retrieves the returns filed against an order, oldest first.
    async fn returns_for_order(&self, order_id: OrderId) -> Result<Vec<ReturnRequest>>;

    /// Retrieves the policy for an (already upper-cased) country code.
    async fn policy(&self, country_code: &CountryCode) -> Result<Option<Policy>>;

    async fn ticket(&self, id: TicketId) -> Result<Option<Ticket>>;
}

/// Extension trait providing convenience methods for ledger stores.
#[async_trait]
pub trait LedgerStoreExt: LedgerStore {
    /// Commits a unit with a single insert.
    async fn insert<R>(&self, record: R) -> Result<()>
    where
        R: Into<crate::Record> + Send,
    {
        self.commit(UnitOfWork::new().insert(record)).await
    }

    /// Commits a batch of independent inserts as one unit.
    async fn insert_all<I>(&self, records: I) -> Result<()>
    where
        I: IntoIterator + Send,
        I::Item: Into<crate::Record>,
        I::IntoIter: Send,
    {
        let unit = records
            .into_iter()
            .fold(UnitOfWork::new(), |unit, record| unit.insert(record));
        self.commit(unit).await
    }
}

// Blanket implementation for all LedgerStore implementations
impl<T: LedgerStore + ?Sized> LedgerStoreExt for T {}
