//! Demo data set loaded at startup when `SEED_DEMO_DATA` is enabled.
//!
//! Tracking ids and SKUs are fixed so support scenarios can be replayed by
//! hand: `DELAYEDnnn` shipments stuck in transit, `WRONGnnn` deliveries with
//! a picking-error note, `OLDnnn` orders past their refund window, `EXCPTnnn`
//! carrier exceptions, and `SPLITnnnA`/`SPLITnnnB` split shipments.
//! `HEADSET-Z3` is stocked at zero.

use chrono::{DateTime, Duration, Utc};
use common::{
    CountryCode, CustomerId, Money, NoteId, NoteVisibility, OrderId, OrderStatus, ShipmentEventId,
    ShipmentId, ShipmentStatus, TicketId, TicketPriority, TicketStatus, TicketType,
};
use ledger_store::{
    Customer, InventoryItem, LedgerStore, LedgerStoreExt, Order, OrderItem, OrderNote, Policy,
    Record, Shipment, ShipmentEvent, Ticket,
};

const POLICIES: &[(&str, i64, i64, &str)] = &[
    ("HR", 30, 30, "Standard policy. VIP customers may request exceptions."),
    ("US", 30, 30, "Standard policy. VIP customers may request exceptions."),
    ("DE", 30, 45, "Extended replacement window for DE. VIP exceptions available."),
    ("IT", 14, 14, "Shorter windows for IT market. VIP exceptions available."),
    ("UK", 30, 30, "Standard policy. VIP customers may request exceptions."),
    ("FR", 30, 30, "Standard policy. VIP customers may request exceptions."),
    ("ES", 30, 30, "Standard policy. VIP customers may request exceptions."),
    ("NL", 30, 30, "Standard policy. VIP customers may request exceptions."),
    ("AT", 30, 30, "Standard policy. VIP customers may request exceptions."),
    ("PL", 30, 30, "Standard policy. VIP customers may request exceptions."),
];

const CUSTOMERS: &[(&str, &str, &str, &[&str])] = &[
    ("ivan.horvat@example.hr", "Ivan Horvat", "HR", &["vip"]),
    ("john.smith@example.com", "John Smith", "US", &["frequent_traveler"]),
    ("anna.mueller@example.de", "Anna Müller", "DE", &["vip"]),
    ("marco.rossi@example.it", "Marco Rossi", "IT", &[]),
    ("emily.jones@example.uk", "Emily Jones", "UK", &["vip", "frequent_traveler"]),
    ("marie.dupont@example.fr", "Marie Dupont", "FR", &[]),
    ("carlos.garcia@example.es", "Carlos García", "ES", &[]),
    ("sophie.vandenberg@example.nl", "Sophie van den Berg", "NL", &["vip"]),
    ("wolfgang.schmidt@example.at", "Wolfgang Schmidt", "AT", &[]),
    ("anna.kowalska@example.pl", "Anna Kowalska", "PL", &[]),
];

// (sku, name, available, reorder threshold, unit price in cents)
const PRODUCTS: &[(&str, &str, i64, i64, i64)] = &[
    ("LAPTOP-X1", "Premium Laptop X1", 50, 10, 119_999),
    ("PHONE-Y2", "Smartphone Y2", 100, 20, 69_999),
    ("HEADSET-Z3", "Wireless Headset Z3", 0, 15, 8_999),
    ("MOUSE-M4", "Gaming Mouse M4", 200, 30, 4_999),
    ("KEYBOARD-K5", "Mechanical Keyboard K5", 75, 20, 7_999),
    ("MONITOR-V6", "4K Monitor V6", 30, 5, 32_999),
    ("CABLE-C7", "USB-C Cable Premium", 500, 100, 1_999),
    ("TABLET-T10", "Premium Tablet T10", 40, 8, 29_999),
];

const DELAY_REASONS: &[&str] = &[
    "Weather delays affecting regional hub",
    "Customs clearance taking longer than expected",
    "High package volume during peak season",
    "Mechanical issues with delivery vehicle",
    "Address verification needed",
];

const TICKETS: &[(TicketType, TicketPriority, TicketStatus, &str, &str)] = &[
    (
        TicketType::Warehouse,
        TicketPriority::High,
        TicketStatus::Open,
        "Inventory discrepancy for SKU HEADSET-Z3",
        "Physical count shows 5 units but system shows 0. Need immediate reconciliation.",
    ),
    (
        TicketType::Carrier,
        TicketPriority::Medium,
        TicketStatus::InProgress,
        "Multiple delayed shipments with FedEx",
        "Pattern of delays in the Northeast region. Escalate with the carrier account manager.",
    ),
    (
        TicketType::Billing,
        TicketPriority::Low,
        TicketStatus::Open,
        "Invoice reconciliation for December",
        "Monthly carrier invoice review and approval needed.",
    ),
    (
        TicketType::Support,
        TicketPriority::High,
        TicketStatus::InProgress,
        "VIP customer escalation - wrong item received",
        "VIP customer Anna Müller received the wrong item. Needs an expedited replacement \
         and manager approval for a courtesy discount.",
    ),
];

const EXCEPTION_REASONS: &[&str] = &[
    "Incorrect address - unable to locate recipient",
    "Business closed - recipient unavailable",
    "Customs hold - additional documentation required",
];

/// Counts of what [`seed_demo_data`] wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub policies: usize,
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
    pub shipments: usize,
    pub tickets: usize,
}

/// Accumulates records in dependency order so they commit as one unit.
struct SeedBuilder {
    now: DateTime<Utc>,
    customers: Vec<Customer>,
    records: Vec<Record>,
    summary: SeedSummary,
}

impl SeedBuilder {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            customers: Vec::new(),
            records: Vec::new(),
            summary: SeedSummary::default(),
        }
    }

    fn days_ago(&self, days: i64) -> DateTime<Utc> {
        self.now - Duration::days(days)
    }

    fn hours_ago(&self, hours: i64) -> DateTime<Utc> {
        self.now - Duration::hours(hours)
    }

    fn customer(&self, index: usize) -> &Customer {
        &self.customers[index % self.customers.len()]
    }

    fn reference_data(&mut self) {
        for &(code, refund, replacement, notes) in POLICIES {
            self.records.push(
                Policy {
                    country_code: CountryCode::new(code),
                    refund_window_days: refund,
                    replacement_window_days: replacement,
                    notes: notes.to_string(),
                }
                .into(),
            );
            self.summary.policies += 1;
        }

        for &(email, name, country, tags) in CUSTOMERS {
            let customer = Customer {
                id: CustomerId::new(),
                email: email.to_string(),
                name: name.to_string(),
                country_code: CountryCode::new(country),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                created_at: self.days_ago(365),
            };
            self.customers.push(customer.clone());
            self.records.push(customer.into());
            self.summary.customers += 1;
        }

        for &(sku, name, available, threshold, _) in PRODUCTS {
            let mut item =
                InventoryItem::new(sku, name, available).with_reorder_threshold(threshold);
            item.updated_at = self.now;
            self.records.push(item.into());
            self.summary.products += 1;
        }
    }

    fn order(
        &mut self,
        customer_index: usize,
        status: OrderStatus,
        skus: &[&str],
        created_days_ago: i64,
        delivered_days_ago: Option<i64>,
    ) -> OrderId {
        let items: Vec<OrderItem> = skus
            .iter()
            .filter_map(|sku| PRODUCTS.iter().find(|p| p.0 == *sku))
            .map(|&(sku, name, _, _, cents)| OrderItem::new(sku, name, 1, Money::from_cents(cents)))
            .collect();
        let delivered_at = delivered_days_ago.map(|d| self.days_ago(d));
        let currency = match self.customer(customer_index).country_code.as_str() {
            "US" => "USD",
            "UK" => "GBP",
            "PL" => "PLN",
            _ => "EUR",
        };

        let order = Order {
            id: OrderId::new(),
            customer_id: self.customer(customer_index).id,
            status,
            total_amount: items.iter().map(OrderItem::total_price).sum(),
            currency: currency.to_string(),
            items,
            created_at: self.days_ago(created_days_ago),
            updated_at: delivered_at.unwrap_or_else(|| self.days_ago(created_days_ago - 1)),
            delivered_at,
        };
        let id = order.id;
        self.records.push(order.into());
        self.summary.orders += 1;
        id
    }

    fn note(
        &mut self,
        order_id: OrderId,
        visibility: NoteVisibility,
        note: &str,
        at: DateTime<Utc>,
    ) {
        self.records.push(
            OrderNote {
                id: NoteId::new(),
                order_id,
                note: note.to_string(),
                visibility,
                created_at: at,
            }
            .into(),
        );
    }

    /// Adds a shipment whose cached status mirrors the last of `events`.
    fn shipment(
        &mut self,
        order_id: OrderId,
        carrier: &str,
        tracking_id: String,
        estimated_delivery_date: Option<DateTime<Utc>>,
        events: &[(DateTime<Utc>, &str, ShipmentStatus, &str)],
    ) {
        let Some(&(last_time, _, last_status, _)) = events.last() else {
            return;
        };
        let shipment = Shipment {
            id: ShipmentId::new(),
            order_id,
            carrier: carrier.to_string(),
            tracking_id,
            status: last_status,
            estimated_delivery_date,
            last_update_at: last_time,
        };
        let shipment_id = shipment.id;
        self.records.push(shipment.into());
        for &(event_time, location, status, message) in events {
            self.records.push(
                ShipmentEvent {
                    id: ShipmentEventId::new(),
                    shipment_id,
                    event_time,
                    location: Some(location.to_string()),
                    status,
                    message: message.to_string(),
                }
                .into(),
            );
        }
        self.summary.shipments += 1;
    }

    fn delayed(&mut self, count: i64) {
        for i in 0..count {
            let order_id =
                self.order(i as usize, OrderStatus::Shipped, &["LAPTOP-X1"], 5 + i, None);
            let events = [
                (
                    self.days_ago(4 + i),
                    "Origin Hub",
                    ShipmentStatus::LabelCreated,
                    "Shipping label created",
                ),
                (
                    self.days_ago(3 + i),
                    "Sorting Facility",
                    ShipmentStatus::InTransit,
                    "Package in transit",
                ),
                (
                    self.hours_ago(6 + i),
                    "Regional Distribution Center",
                    ShipmentStatus::Delayed,
                    DELAY_REASONS[i as usize % DELAY_REASONS.len()],
                ),
            ];
            let carrier = ["FedEx", "UPS", "DHL", "USPS"][i as usize % 4];
            let eta = Some(self.days_ago(-2));
            self.shipment(order_id, carrier, format!("DELAYED{:03}", i + 1), eta, &events);
        }
    }

    fn wrong_item(&mut self, count: i64) {
        for i in 0..count {
            let delivered = 5 + i;
            let order_id = self.order(
                i as usize,
                OrderStatus::Delivered,
                &["PHONE-Y2"],
                10 + i,
                Some(delivered),
            );
            let country = self.customer(i as usize).country_code.to_string();
            let events = [
                (self.days_ago(9 + i), "Warehouse", ShipmentStatus::LabelCreated, "Label created"),
                (
                    self.days_ago(7 + i),
                    "In transit",
                    ShipmentStatus::InTransit,
                    "Package in transit",
                ),
                (
                    self.days_ago(delivered),
                    country.as_str(),
                    ShipmentStatus::Delivered,
                    "Delivered",
                ),
            ];
            let eta = Some(self.days_ago(delivered));
            self.shipment(order_id, "FedEx", format!("WRONG{:03}", i + 1), eta, &events);
            let noted_at = self.days_ago(delivered - 1);
            self.note(
                order_id,
                NoteVisibility::Internal,
                "Customer ordered PHONE-Y2 but may have received HEADSET-Z3 instead. \
                 Warehouse picking error suspected.",
                noted_at,
            );
        }
    }

    fn outside_window(&mut self, count: i64) {
        for i in 0..count {
            let delivered = 35 + i * 2;
            let order_id = self.order(
                i as usize + 3,
                OrderStatus::Delivered,
                &["TABLET-T10"],
                delivered + 5,
                Some(delivered),
            );
            let events = [
                (
                    self.days_ago(delivered + 4),
                    "Warehouse",
                    ShipmentStatus::LabelCreated,
                    "Label created",
                ),
                (
                    self.days_ago(delivered),
                    "Customer address",
                    ShipmentStatus::Delivered,
                    "Delivered",
                ),
            ];
            self.shipment(order_id, "UPS", format!("OLD{:03}", i + 1), None, &events);
        }
    }

    fn vip_exception(&mut self) {
        // Ivan Horvat: VIP, delivered past the HR refund window.
        let order_id = self.order(0, OrderStatus::Delivered, &["MONITOR-V6"], 45, Some(40));
        let events = [
            (self.days_ago(44), "Zagreb Hub", ShipmentStatus::LabelCreated, "Label created"),
            (self.days_ago(40), "Zagreb", ShipmentStatus::Delivered, "Delivered"),
        ];
        self.shipment(order_id, "DHL", "VIP001".to_string(), None, &events);
        let (placed_at, escalated_at) = (self.days_ago(45), self.days_ago(39));
        self.note(
            order_id,
            NoteVisibility::Public,
            "Order processed successfully. Thank you for your purchase!",
            placed_at,
        );
        self.note(
            order_id,
            NoteVisibility::Internal,
            "VIP customer. Consider exception for late return/refund requests. \
             Manager approval may be granted.",
            escalated_at,
        );
    }

    fn carrier_exception(&mut self, count: i64) {
        for i in 0..count {
            let order_id =
                self.order(i as usize + 5, OrderStatus::Shipped, &["MONITOR-V6"], 8 + i, None);
            let events = [
                (
                    self.days_ago(7 + i),
                    "Origin",
                    ShipmentStatus::LabelCreated,
                    "Shipping label created",
                ),
                (
                    self.days_ago(5 + i),
                    "In transit",
                    ShipmentStatus::InTransit,
                    "Package in transit",
                ),
                (
                    self.hours_ago(12 + i * 2),
                    "Destination hub",
                    ShipmentStatus::Exception,
                    EXCEPTION_REASONS[i as usize % EXCEPTION_REASONS.len()],
                ),
            ];
            self.shipment(order_id, "DHL", format!("EXCPT{:03}", i + 1), None, &events);
        }
    }

    fn split_shipment(&mut self, count: i64) {
        for i in 0..count {
            let order_id = self.order(
                i as usize + 2,
                OrderStatus::Shipped,
                &["LAPTOP-X1", "MOUSE-M4", "KEYBOARD-K5"],
                12 + i,
                None,
            );
            let country = self.customer(i as usize + 2).country_code.to_string();
            let first = [
                (
                    self.days_ago(11 + i),
                    "Warehouse A",
                    ShipmentStatus::LabelCreated,
                    "Shipment 1 of 2 - Label created",
                ),
                (
                    self.days_ago(5 + i),
                    country.as_str(),
                    ShipmentStatus::Delivered,
                    "Shipment 1 of 2 delivered",
                ),
            ];
            let eta = Some(self.days_ago(5 + i));
            self.shipment(order_id, "FedEx", format!("SPLIT{:03}A", i + 1), eta, &first);

            let second = [
                (
                    self.days_ago(4 + i),
                    "Warehouse B",
                    ShipmentStatus::LabelCreated,
                    "Shipment 2 of 2 - Label created",
                ),
                (
                    self.hours_ago(20 + i),
                    "Sorting Facility",
                    ShipmentStatus::InTransit,
                    "Shipment 2 of 2 in transit",
                ),
            ];
            let eta = Some(self.days_ago(-3));
            self.shipment(order_id, "UPS", format!("SPLIT{:03}B", i + 1), eta, &second);
        }
    }

    fn pending(&mut self) {
        self.order(9, OrderStatus::Created, &["CABLE-C7", "MOUSE-M4"], 1, None);
    }

    fn tickets(&mut self) {
        for (i, &(ticket_type, priority, status, title, body)) in TICKETS.iter().enumerate() {
            self.records.push(
                Ticket {
                    id: TicketId::new(),
                    ticket_type,
                    priority,
                    title: title.to_string(),
                    body: body.to_string(),
                    status,
                    created_at: self.days_ago(i as i64 + 1),
                }
                .into(),
            );
            self.summary.tickets += 1;
        }
    }
}

/// Writes the demo data set in a single unit of work.
///
/// Fails with a unique violation if the data has already been loaded.
#[tracing::instrument(skip(store))]
pub async fn seed_demo_data<S: LedgerStore>(
    store: &S,
    now: DateTime<Utc>,
) -> ledger_store::Result<SeedSummary> {
    let mut builder = SeedBuilder::new(now);
    builder.reference_data();
    builder.delayed(5);
    builder.wrong_item(3);
    builder.outside_window(3);
    builder.vip_exception();
    builder.carrier_exception(3);
    builder.split_shipment(2);
    builder.pending();
    builder.tickets();

    let SeedBuilder {
        records, summary, ..
    } = builder;
    store.insert_all(records).await?;

    tracing::info!(
        policies = summary.policies,
        customers = summary.customers,
        products = summary.products,
        orders = summary.orders,
        shipments = summary.shipments,
        tickets = summary.tickets,
        "Seeded demo data"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use common::Sku;
    use ledger_store::InMemoryLedgerStore;

    use super::*;

    #[tokio::test]
    async fn test_seed_loads_reference_data() {
        let store = InMemoryLedgerStore::new();
        let summary = seed_demo_data(&store, Utc::now()).await.unwrap();

        assert_eq!(summary.policies, 10);
        assert_eq!(summary.customers, 10);
        assert_eq!(summary.shipments, 5 + 3 + 3 + 1 + 3 + 4);
        assert_eq!(summary.tickets, 4);

        let headset = store
            .inventory_item(&Sku::new("HEADSET-Z3"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(headset.record.available_qty, 0);

        let it = store.policy(&CountryCode::new("it")).await.unwrap().unwrap();
        assert_eq!(it.refund_window_days, 14);
    }

    #[tokio::test]
    async fn test_seed_shipment_status_mirrors_last_event() {
        let store = InMemoryLedgerStore::new();
        seed_demo_data(&store, Utc::now()).await.unwrap();

        let shipment = store
            .shipment_by_tracking_id("DELAYED001")
            .await
            .unwrap()
            .unwrap()
            .record;
        assert_eq!(shipment.status, ShipmentStatus::Delayed);

        let events = store.shipment_events(shipment.id).await.unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].status, ShipmentStatus::Delayed);
        assert_eq!(events[0].event_time, shipment.last_update_at);
    }

    #[tokio::test]
    async fn test_seeding_twice_fails() {
        let store = InMemoryLedgerStore::new();
        seed_demo_data(&store, Utc::now()).await.unwrap();
        assert!(seed_demo_data(&store, Utc::now()).await.is_err());
    }
}
