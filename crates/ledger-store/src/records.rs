//! Record types persisted by the ledger store, one per stored entity.

use chrono::{DateTime, Utc};
use common::{
    CountryCode, CustomerId, Money, NoteId, NoteVisibility, OrderId, OrderStatus, ReservationId,
    ReturnId, ReturnReason, ReturnStatus, ShipmentEventId, ShipmentId, ShipmentStatus, Sku,
    TicketId, TicketPriority, TicketStatus, TicketType,
};
use serde::{Deserialize, Serialize};

/// Stock levels for one SKU.
///
/// `available_qty + reserved_qty` is conserved by reserve/release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub sku: Sku,
    pub name: String,
    pub available_qty: i64,
    pub reserved_qty: i64,
    pub reorder_threshold: i64,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(sku: impl Into<Sku>, name: impl Into<String>, available_qty: i64) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            available_qty,
            reserved_qty: 0,
            reorder_threshold: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn with_reorder_threshold(mut self, threshold: i64) -> Self {
        self.reorder_threshold = threshold;
        self
    }

    /// Total units on hand, held or not.
    pub fn on_hand(&self) -> i64 {
        self.available_qty + self.reserved_qty
    }
}

/// A hold against available stock. Never deleted; `released_at` marks the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub sku: Sku,
    pub qty: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub released_at: Option<DateTime<Utc>>,
}

impl Reservation {
    pub fn is_active(&self) -> bool {
        self.released_at.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub email: String,
    pub name: String,
    pub country_code: CountryCode,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn is_vip(&self) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case("vip"))
    }
}

/// A line item. Immutable once the order exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub sku: Sku,
    pub name: String,
    pub qty: i64,
    pub unit_price: Money,
}

impl OrderItem {
    pub fn new(sku: impl Into<Sku>, name: impl Into<String>, qty: i64, unit_price: Money) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            qty,
            unit_price,
        }
    }

    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.qty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub currency: String,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderNote {
    pub id: NoteId,
    pub order_id: OrderId,
    pub note: String,
    pub visibility: NoteVisibility,
    pub created_at: DateTime<Utc>,
}

/// A parcel belonging to one order.
///
/// `status` and `last_update_at` mirror the newest [`ShipmentEvent`]; they are
/// only ever written in the same unit of work that appends that event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub order_id: OrderId,
    pub carrier: String,
    pub tracking_id: String,
    pub status: ShipmentStatus,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub last_update_at: DateTime<Utc>,
}

/// One entry of a shipment's append-only tracking log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentEvent {
    pub id: ShipmentEventId,
    pub shipment_id: ShipmentId,
    pub event_time: DateTime<Utc>,
    pub location: Option<String>,
    pub status: ShipmentStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub id: ReturnId,
    pub order_id: OrderId,
    pub reason_code: ReturnReason,
    pub details: Option<String>,
    pub status: ReturnStatus,
    pub requested_at: DateTime<Utc>,
    /// Set only when the return reaches `refunded`.
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Per-country return windows. Administered outside the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub country_code: CountryCode,
    pub refund_window_days: i64,
    pub replacement_window_days: i64,
    pub notes: String,
}

/// An operations ticket raised for a team outside the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub priority: TicketPriority,
    pub title: String,
    pub body: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

/// Any record the store can persist, tagged by collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Inventory(InventoryItem),
    Reservation(Reservation),
    Customer(Customer),
    Order(Order),
    OrderNote(OrderNote),
    Shipment(Shipment),
    ShipmentEvent(ShipmentEvent),
    Return(ReturnRequest),
    Policy(Policy),
    Ticket(Ticket),
}

impl Record {
    /// Name of the collection (table) the record lives in.
    pub fn collection(&self) -> &'static str {
        match self {
            Record::Inventory(_) => "inventory",
            Record::Reservation(_) => "inventory_reservations",
            Record::Customer(_) => "customers",
            Record::Order(_) => "orders",
            Record::OrderNote(_) => "order_notes",
            Record::Shipment(_) => "shipments",
            Record::ShipmentEvent(_) => "shipment_events",
            Record::Return(_) => "returns",
            Record::Policy(_) => "policies",
            Record::Ticket(_) => "tickets",
        }
    }

    /// Primary key rendered as a string, for error messages and logs.
    pub fn key(&self) -> String {
        match self {
            Record::Inventory(r) => r.sku.to_string(),
            Record::Reservation(r) => r.id.to_string(),
            Record::Customer(r) => r.id.to_string(),
            Record::Order(r) => r.id.to_string(),
            Record::OrderNote(r) => r.id.to_string(),
            Record::Shipment(r) => r.id.to_string(),
            Record::ShipmentEvent(r) => r.id.to_string(),
            Record::Return(r) => r.id.to_string(),
            Record::Policy(r) => r.country_code.to_string(),
            Record::Ticket(r) => r.id.to_string(),
        }
    }

    /// Whether committed records of this kind may be updated.
    pub fn is_mutable(&self) -> bool {
        matches!(
            self,
            Record::Inventory(_)
                | Record::Reservation(_)
                | Record::Order(_)
                | Record::Shipment(_)
                | Record::Return(_)
        )
    }
}

macro_rules! impl_from_record {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for Record {
                fn from(record: $ty) -> Self {
                    Record::$variant(record)
                }
            }
        )+
    };
}

impl_from_record!(
    Inventory(InventoryItem),
    Reservation(Reservation),
    Customer(Customer),
    Order(Order),
    OrderNote(OrderNote),
    Shipment(Shipment),
    ShipmentEvent(ShipmentEvent),
    Return(ReturnRequest),
    Policy(Policy),
    Ticket(Ticket),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_hand_sums_both_pools() {
        let mut item = InventoryItem::new("MOUSE-M4", "Gaming Mouse M4", 200);
        item.reserved_qty = 5;
        assert_eq!(item.on_hand(), 205);
    }

    #[test]
    fn vip_tag_is_case_insensitive() {
        let customer = Customer {
            id: CustomerId::new(),
            email: "ivan.horvat@example.hr".to_string(),
            name: "Ivan Horvat".to_string(),
            country_code: CountryCode::new("HR"),
            tags: vec!["VIP".to_string()],
            created_at: Utc::now(),
        };
        assert!(customer.is_vip());
    }

    #[test]
    fn only_stateful_records_are_mutable() {
        let item = Record::from(InventoryItem::new("CABLE-C7", "USB-C Cable", 500));
        assert!(item.is_mutable());
        assert_eq!(item.collection(), "inventory");
        assert_eq!(item.key(), "CABLE-C7");

        let policy = Record::from(Policy {
            country_code: CountryCode::new("de"),
            refund_window_days: 30,
            replacement_window_days: 45,
            notes: String::new(),
        });
        assert!(!policy.is_mutable());
        assert_eq!(policy.key(), "DE");
    }
}
