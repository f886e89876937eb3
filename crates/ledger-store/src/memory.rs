use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use common::{
    CountryCode, CustomerId, NoteId, OrderId, ReservationId, ReturnId, ShipmentEventId,
    ShipmentId, Sku, TicketId,
};
use tokio::sync::RwLock;

use crate::records::{
    Customer, InventoryItem, Order, OrderNote, Policy, Record, Reservation, ReturnRequest,
    Shipment, ShipmentEvent, Ticket,
};
use crate::{LedgerStore, LedgerStoreError, Mutation, Result, UnitOfWork, Version, Versioned};

#[derive(Debug, Default)]
struct Tables {
    inventory: BTreeMap<Sku, Versioned<InventoryItem>>,
    reservations: HashMap<ReservationId, Versioned<Reservation>>,
    customers: HashMap<CustomerId, Customer>,
    orders: HashMap<OrderId, Versioned<Order>>,
    notes: HashMap<NoteId, OrderNote>,
    shipments: HashMap<ShipmentId, Versioned<Shipment>>,
    shipment_events: HashMap<ShipmentEventId, ShipmentEvent>,
    returns: HashMap<ReturnId, Versioned<ReturnRequest>>,
    policies: HashMap<CountryCode, Policy>,
    tickets: HashMap<TicketId, Ticket>,
}

impl Tables {
    /// Version currently stored under the record's key, if any.
    fn stored_version(&self, record: &Record) -> Option<Version> {
        match record {
            Record::Inventory(r) => self.inventory.get(&r.sku).map(|v| v.version),
            Record::Reservation(r) => self.reservations.get(&r.id).map(|v| v.version),
            Record::Order(r) => self.orders.get(&r.id).map(|v| v.version),
            Record::Shipment(r) => self.shipments.get(&r.id).map(|v| v.version),
            Record::Return(r) => self.returns.get(&r.id).map(|v| v.version),
            Record::Customer(r) => self.customers.contains_key(&r.id).then(Version::first),
            Record::OrderNote(r) => self.notes.contains_key(&r.id).then(Version::first),
            Record::ShipmentEvent(r) => {
                self.shipment_events.contains_key(&r.id).then(Version::first)
            }
            Record::Policy(r) => self
                .policies
                .contains_key(&r.country_code)
                .then(Version::first),
            Record::Ticket(r) => self.tickets.contains_key(&r.id).then(Version::first),
        }
    }

    fn check_version(&self, mutation: &Mutation) -> Result<()> {
        let record = mutation.record();
        let stored = self.stored_version(record);

        match (mutation, stored) {
            (Mutation::Insert(_), None) => Ok(()),
            (Mutation::Insert(_), Some(_)) => Err(LedgerStoreError::UniqueViolation {
                collection: record.collection(),
                key: record.key(),
            }),
            (Mutation::Update { expected, .. }, actual) => {
                let actual = actual.unwrap_or(Version::initial());
                if actual == *expected {
                    Ok(())
                } else {
                    Err(LedgerStoreError::ConcurrencyConflict {
                        collection: record.collection(),
                        key: record.key(),
                        expected: *expected,
                        actual,
                    })
                }
            }
        }
    }

    /// Secondary unique keys: customer email and shipment tracking id.
    fn check_unique(&self, record: &Record, earlier: &[&Record]) -> Result<()> {
        match record {
            Record::Customer(c) => {
                let clashes = |other: &Customer| other.id != c.id && other.email == c.email;
                let taken = self.customers.values().any(clashes)
                    || earlier
                        .iter()
                        .any(|r| matches!(r, Record::Customer(other) if clashes(other)));
                if taken {
                    return Err(LedgerStoreError::UniqueViolation {
                        collection: "customers",
                        key: c.email.clone(),
                    });
                }
            }
            Record::Shipment(s) => {
                let clashes =
                    |other: &Shipment| other.id != s.id && other.tracking_id == s.tracking_id;
                let taken = self.shipments.values().any(|other| clashes(&other.record))
                    || earlier
                        .iter()
                        .any(|r| matches!(r, Record::Shipment(other) if clashes(other)));
                if taken {
                    return Err(LedgerStoreError::UniqueViolation {
                        collection: "shipments",
                        key: s.tracking_id.clone(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Foreign keys: a record may reference parents stored already or
    /// inserted earlier in the same unit.
    fn check_references(&self, record: &Record, earlier: &[&Record]) -> Result<()> {
        let missing = |target: &'static str, key: String| LedgerStoreError::MissingReference {
            collection: record.collection(),
            target,
            key,
        };

        match record {
            Record::Reservation(r) => {
                let found = self.inventory.contains_key(&r.sku)
                    || earlier
                        .iter()
                        .any(|e| matches!(e, Record::Inventory(i) if i.sku == r.sku));
                if !found {
                    return Err(missing("inventory", r.sku.to_string()));
                }
            }
            Record::Order(o) => {
                let found = self.customers.contains_key(&o.customer_id)
                    || earlier
                        .iter()
                        .any(|e| matches!(e, Record::Customer(c) if c.id == o.customer_id));
                if !found {
                    return Err(missing("customers", o.customer_id.to_string()));
                }
            }
            Record::OrderNote(n) => {
                if !self.has_order(n.order_id, earlier) {
                    return Err(missing("orders", n.order_id.to_string()));
                }
            }
            Record::Shipment(s) => {
                if !self.has_order(s.order_id, earlier) {
                    return Err(missing("orders", s.order_id.to_string()));
                }
            }
            Record::Return(r) => {
                if !self.has_order(r.order_id, earlier) {
                    return Err(missing("orders", r.order_id.to_string()));
                }
            }
            Record::ShipmentEvent(e) => {
                let found = self.shipments.contains_key(&e.shipment_id)
                    || earlier
                        .iter()
                        .any(|r| matches!(r, Record::Shipment(s) if s.id == e.shipment_id));
                if !found {
                    return Err(missing("shipments", e.shipment_id.to_string()));
                }
            }
            Record::Inventory(_)
            | Record::Customer(_)
            | Record::Policy(_)
            | Record::Ticket(_) => {}
        }
        Ok(())
    }

    fn has_order(&self, order_id: OrderId, earlier: &[&Record]) -> bool {
        self.orders.contains_key(&order_id)
            || earlier
                .iter()
                .any(|r| matches!(r, Record::Order(o) if o.id == order_id))
    }

    fn apply(&mut self, mutation: Mutation) {
        let (record, version) = match mutation {
            Mutation::Insert(record) => (record, Version::first()),
            Mutation::Update { record, expected } => (record, expected.next()),
        };

        match record {
            Record::Inventory(r) => {
                self.inventory.insert(r.sku.clone(), Versioned::new(r, version));
            }
            Record::Reservation(r) => {
                self.reservations.insert(r.id, Versioned::new(r, version));
            }
            Record::Order(r) => {
                self.orders.insert(r.id, Versioned::new(r, version));
            }
            Record::Shipment(r) => {
                self.shipments.insert(r.id, Versioned::new(r, version));
            }
            Record::Return(r) => {
                self.returns.insert(r.id, Versioned::new(r, version));
            }
            Record::Customer(r) => {
                self.customers.insert(r.id, r);
            }
            Record::OrderNote(r) => {
                self.notes.insert(r.id, r);
            }
            Record::ShipmentEvent(r) => {
                self.shipment_events.insert(r.id, r);
            }
            Record::Policy(r) => {
                self.policies.insert(r.country_code.clone(), r);
            }
            Record::Ticket(r) => {
                self.tickets.insert(r.id, r);
            }
        }
    }
}

/// In-memory ledger store.
///
/// Provides the same interface and constraint checks as the PostgreSQL
/// implementation. A commit validates every mutation under the write lock
/// before applying any of them.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryLedgerStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of reservations ever created.
    pub async fn reservation_count(&self) -> usize {
        self.tables.read().await.reservations.len()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn commit(&self, unit: UnitOfWork) -> Result<()> {
        unit.validate()?;
        let mutations = unit.into_mutations();

        let mut tables = self.tables.write().await;

        for (i, mutation) in mutations.iter().enumerate() {
            let earlier: Vec<&Record> = mutations[..i]
                .iter()
                .filter(|m| matches!(m, Mutation::Insert(_)))
                .map(Mutation::record)
                .collect();

            tables.check_version(mutation)?;
            tables.check_unique(mutation.record(), &earlier)?;
            tables.check_references(mutation.record(), &earlier)?;
        }

        for mutation in mutations {
            tables.apply(mutation);
        }

        Ok(())
    }

    async fn inventory_item(&self, sku: &Sku) -> Result<Option<Versioned<InventoryItem>>> {
        Ok(self.tables.read().await.inventory.get(sku).cloned())
    }

    async fn inventory_items(&self) -> Result<Vec<InventoryItem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .inventory
            .values()
            .map(|v| v.record.clone())
            .collect())
    }

    async fn reservation(&self, id: ReservationId) -> Result<Option<Versioned<Reservation>>> {
        Ok(self.tables.read().await.reservations.get(&id).cloned())
    }

    async fn active_reservations(&self, sku: &Sku) -> Result<Vec<Reservation>> {
        let tables = self.tables.read().await;
        let mut active: Vec<_> = tables
            .reservations
            .values()
            .map(|v| &v.record)
            .filter(|r| &r.sku == sku && r.is_active())
            .cloned()
            .collect();
        active.sort_by_key(|r| r.created_at);
        Ok(active)
    }

    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(&id).cloned())
    }

    async fn customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let tables = self.tables.read().await;
        Ok(tables.customers.values().find(|c| c.email == email).cloned())
    }

    async fn order(&self, id: OrderId) -> Result<Option<Versioned<Order>>> {
        Ok(self.tables.read().await.orders.get(&id).cloned())
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let tables = self.tables.read().await;
        let mut orders: Vec<_> = tables
            .orders
            .values()
            .map(|v| &v.record)
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn order_notes(&self, order_id: OrderId) -> Result<Vec<OrderNote>> {
        let tables = self.tables.read().await;
        let mut notes: Vec<_> = tables
            .notes
            .values()
            .filter(|n| n.order_id == order_id)
            .cloned()
            .collect();
        notes.sort_by_key(|n| n.created_at);
        Ok(notes)
    }

    async fn shipment(&self, id: ShipmentId) -> Result<Option<Versioned<Shipment>>> {
        Ok(self.tables.read().await.shipments.get(&id).cloned())
    }

    async fn shipment_by_tracking_id(
        &self,
        tracking_id: &str,
    ) -> Result<Option<Versioned<Shipment>>> {
        let tables = self.tables.read().await;
        Ok(tables
            .shipments
            .values()
            .find(|s| s.record.tracking_id == tracking_id)
            .cloned())
    }

    async fn shipments_for_order(&self, order_id: OrderId) -> Result<Vec<Shipment>> {
        let tables = self.tables.read().await;
        let mut shipments: Vec<_> = tables
            .shipments
            .values()
            .map(|v| &v.record)
            .filter(|s| s.order_id == order_id)
            .cloned()
            .collect();
        shipments.sort_by(|a, b| a.tracking_id.cmp(&b.tracking_id));
        Ok(shipments)
    }

    async fn shipment_events(&self, shipment_id: ShipmentId) -> Result<Vec<ShipmentEvent>> {
        let tables = self.tables.read().await;
        let mut events: Vec<_> = tables
            .shipment_events
            .values()
            .filter(|e| e.shipment_id == shipment_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| (b.event_time, b.id).cmp(&(a.event_time, a.id)));
        Ok(events)
    }

    async fn return_request(&self, id: ReturnId) -> Result<Option<Versioned<ReturnRequest>>> {
        Ok(self.tables.read().await.returns.get(&id).cloned())
    }

    async fn returns_for_order(&self, order_id: OrderId) -> Result<Vec<ReturnRequest>> {
        let tables = self.tables.read().await;
        let mut returns: Vec<_> = tables
            .returns
            .values()
            .map(|v| &v.record)
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect();
        returns.sort_by_key(|r| r.requested_at);
        Ok(returns)
    }

    async fn policy(&self, country_code: &CountryCode) -> Result<Option<Policy>> {
        Ok(self.tables.read().await.policies.get(country_code).cloned())
    }

    async fn ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        Ok(self.tables.read().await.tickets.get(&id).cloned())
    }
}
