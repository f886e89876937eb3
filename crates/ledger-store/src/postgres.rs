use std::fmt::Display;
use std::str::FromStr;

use async_trait::async_trait;
use common::{
    CountryCode, CustomerId, Money, NoteId, OrderId, ReservationId, ReturnId, ShipmentEventId,
    ShipmentId, Sku, TicketId,
};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::records::{
    Customer, InventoryItem, Order, OrderItem, OrderNote, Policy, Record, Reservation,
    ReturnRequest, Shipment, ShipmentEvent, Ticket,
};
use crate::{LedgerStore, LedgerStoreError, Mutation, Result, UnitOfWork, Version, Versioned};

/// PostgreSQL-backed ledger store implementation.
#[derive(Clone)]
pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    /// Creates a new PostgreSQL ledger store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_inventory(row: PgRow) -> Result<Versioned<InventoryItem>> {
        let item = InventoryItem {
            sku: Sku::new(row.try_get::<String, _>("sku")?),
            name: row.try_get("name")?,
            available_qty: row.try_get("available_qty")?,
            reserved_qty: row.try_get("reserved_qty")?,
            reorder_threshold: row.try_get("reorder_threshold")?,
            updated_at: row.try_get("updated_at")?,
        };
        Ok(Versioned::new(item, Version::new(row.try_get("version")?)))
    }

    fn row_to_reservation(row: PgRow) -> Result<Versioned<Reservation>> {
        let reservation = Reservation {
            id: ReservationId::from_uuid(row.try_get::<Uuid, _>("id")?),
            sku: Sku::new(row.try_get::<String, _>("sku")?),
            qty: row.try_get("qty")?,
            reason: row.try_get("reason")?,
            created_at: row.try_get("created_at")?,
            released_at: row.try_get("released_at")?,
        };
        Ok(Versioned::new(reservation, Version::new(row.try_get("version")?)))
    }

    fn row_to_customer(row: PgRow) -> Result<Customer> {
        Ok(Customer {
            id: CustomerId::from_uuid(row.try_get::<Uuid, _>("id")?),
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            country_code: CountryCode::new(row.try_get::<String, _>("country_code")?),
            tags: row.try_get("tags")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_order(row: PgRow) -> Result<Versioned<Order>> {
        let Json(items) = row.try_get::<Json<Vec<OrderItem>>, _>("items")?;
        let order = Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            status: decode("orders", row.try_get("status")?)?,
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
            currency: row.try_get("currency")?,
            items,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            delivered_at: row.try_get("delivered_at")?,
        };
        Ok(Versioned::new(order, Version::new(row.try_get("version")?)))
    }

    fn row_to_note(row: PgRow) -> Result<OrderNote> {
        Ok(OrderNote {
            id: NoteId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            note: row.try_get("note")?,
            visibility: decode("order_notes", row.try_get("visibility")?)?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn row_to_shipment(row: PgRow) -> Result<Versioned<Shipment>> {
        let shipment = Shipment {
            id: ShipmentId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            carrier: row.try_get("carrier")?,
            tracking_id: row.try_get("tracking_id")?,
            status: decode("shipments", row.try_get("status")?)?,
            estimated_delivery_date: row.try_get("estimated_delivery_date")?,
            last_update_at: row.try_get("last_update_at")?,
        };
        Ok(Versioned::new(shipment, Version::new(row.try_get("version")?)))
    }

    fn row_to_shipment_event(row: PgRow) -> Result<ShipmentEvent> {
        Ok(ShipmentEvent {
            id: ShipmentEventId::from_uuid(row.try_get::<Uuid, _>("id")?),
            shipment_id: ShipmentId::from_uuid(row.try_get::<Uuid, _>("shipment_id")?),
            event_time: row.try_get("event_time")?,
            location: row.try_get("location")?,
            status: decode("shipment_events", row.try_get("status")?)?,
            message: row.try_get("message")?,
        })
    }

    fn row_to_return(row: PgRow) -> Result<Versioned<ReturnRequest>> {
        let request = ReturnRequest {
            id: ReturnId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            reason_code: decode("returns", row.try_get("reason_code")?)?,
            details: row.try_get("details")?,
            status: decode("returns", row.try_get("status")?)?,
            requested_at: row.try_get("requested_at")?,
            resolved_at: row.try_get("resolved_at")?,
        };
        Ok(Versioned::new(request, Version::new(row.try_get("version")?)))
    }

    fn row_to_policy(row: PgRow) -> Result<Policy> {
        Ok(Policy {
            country_code: CountryCode::new(row.try_get::<String, _>("country_code")?),
            refund_window_days: row.try_get("refund_window_days")?,
            replacement_window_days: row.try_get("replacement_window_days")?,
            notes: row.try_get("notes")?,
        })
    }

    fn row_to_ticket(row: PgRow) -> Result<Ticket> {
        Ok(Ticket {
            id: TicketId::from_uuid(row.try_get::<Uuid, _>("id")?),
            ticket_type: decode("tickets", row.try_get("type")?)?,
            priority: decode("tickets", row.try_get("priority")?)?,
            title: row.try_get("title")?,
            body: row.try_get("body")?,
            status: decode("tickets", row.try_get("status")?)?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Parses a text column into one of the status enums.
fn decode<T>(collection: &'static str, value: String) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e: T::Err| LedgerStoreError::CorruptRecord {
            collection,
            reason: e.to_string(),
        })
}

/// The parent table and key a record points at, if it has one.
fn parent_of(record: &Record) -> Option<(&'static str, String)> {
    match record {
        Record::Reservation(r) => Some(("inventory", r.sku.to_string())),
        Record::Order(r) => Some(("customers", r.customer_id.to_string())),
        Record::OrderNote(r) => Some(("orders", r.order_id.to_string())),
        Record::Shipment(r) => Some(("orders", r.order_id.to_string())),
        Record::ShipmentEvent(r) => Some(("shipments", r.shipment_id.to_string())),
        Record::Return(r) => Some(("orders", r.order_id.to_string())),
        Record::Inventory(_) | Record::Customer(_) | Record::Policy(_) | Record::Ticket(_) => None,
    }
}

fn map_write_error(record: &Record, e: sqlx::Error) -> LedgerStoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return LedgerStoreError::UniqueViolation {
                collection: record.collection(),
                key: record.key(),
            };
        }
        if db_err.is_foreign_key_violation()
            && let Some((target, key)) = parent_of(record)
        {
            return LedgerStoreError::MissingReference {
                collection: record.collection(),
                target,
                key,
            };
        }
    }
    LedgerStoreError::Database(e)
}

async fn insert_record(conn: &mut PgConnection, record: &Record) -> sqlx::Result<()> {
    let query = match record {
        Record::Inventory(r) => sqlx::query(
            r#"
            INSERT INTO inventory
                (sku, name, available_qty, reserved_qty, reorder_threshold, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, 1)
            "#,
        )
        .bind(r.sku.as_str())
        .bind(&r.name)
        .bind(r.available_qty)
        .bind(r.reserved_qty)
        .bind(r.reorder_threshold)
        .bind(r.updated_at),
        Record::Reservation(r) => sqlx::query(
            r#"
            INSERT INTO inventory_reservations
                (id, sku, qty, reason, created_at, released_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, 1)
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.sku.as_str())
        .bind(r.qty)
        .bind(&r.reason)
        .bind(r.created_at)
        .bind(r.released_at),
        Record::Customer(r) => sqlx::query(
            r#"
            INSERT INTO customers (id, email, name, country_code, tags, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(&r.email)
        .bind(&r.name)
        .bind(r.country_code.as_str())
        .bind(&r.tags)
        .bind(r.created_at),
        Record::Order(r) => sqlx::query(
            r#"
            INSERT INTO orders
                (id, customer_id, status, total_amount_cents, currency, items,
                 created_at, updated_at, delivered_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1)
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.customer_id.as_uuid())
        .bind(r.status.as_str())
        .bind(r.total_amount.cents())
        .bind(&r.currency)
        .bind(Json(&r.items))
        .bind(r.created_at)
        .bind(r.updated_at)
        .bind(r.delivered_at),
        Record::OrderNote(r) => sqlx::query(
            r#"
            INSERT INTO order_notes (id, order_id, note, visibility, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.order_id.as_uuid())
        .bind(&r.note)
        .bind(r.visibility.as_str())
        .bind(r.created_at),
        Record::Shipment(r) => sqlx::query(
            r#"
            INSERT INTO shipments
                (id, order_id, carrier, tracking_id, status, estimated_delivery_date,
                 last_update_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 1)
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.order_id.as_uuid())
        .bind(&r.carrier)
        .bind(&r.tracking_id)
        .bind(r.status.as_str())
        .bind(r.estimated_delivery_date)
        .bind(r.last_update_at),
        Record::ShipmentEvent(r) => sqlx::query(
            r#"
            INSERT INTO shipment_events (id, shipment_id, event_time, location, status, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.shipment_id.as_uuid())
        .bind(r.event_time)
        .bind(&r.location)
        .bind(r.status.as_str())
        .bind(&r.message),
        Record::Return(r) => sqlx::query(
            r#"
            INSERT INTO returns
                (id, order_id, reason_code, details, status, requested_at, resolved_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 1)
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.order_id.as_uuid())
        .bind(r.reason_code.as_str())
        .bind(&r.details)
        .bind(r.status.as_str())
        .bind(r.requested_at)
        .bind(r.resolved_at),
        Record::Policy(r) => sqlx::query(
            r#"
            INSERT INTO policies (country_code, refund_window_days, replacement_window_days, notes)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(r.country_code.as_str())
        .bind(r.refund_window_days)
        .bind(r.replacement_window_days)
        .bind(&r.notes),
        Record::Ticket(r) => sqlx::query(
            r#"
            INSERT INTO tickets (id, type, priority, title, body, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.ticket_type.as_str())
        .bind(r.priority.as_str())
        .bind(&r.title)
        .bind(&r.body)
        .bind(r.status.as_str())
        .bind(r.created_at),
    };

    query.execute(&mut *conn).await?;
    Ok(())
}

/// Writes the record only if its row is still at `expected`. Returns the
/// number of rows touched, zero meaning the version moved on.
async fn update_record(
    conn: &mut PgConnection,
    record: &Record,
    expected: Version,
) -> sqlx::Result<u64> {
    let query = match record {
        Record::Inventory(r) => sqlx::query(
            r#"
            UPDATE inventory
            SET name = $2, available_qty = $3, reserved_qty = $4, reorder_threshold = $5,
                updated_at = $6, version = version + 1
            WHERE sku = $1 AND version = $7
            "#,
        )
        .bind(r.sku.as_str())
        .bind(&r.name)
        .bind(r.available_qty)
        .bind(r.reserved_qty)
        .bind(r.reorder_threshold)
        .bind(r.updated_at),
        Record::Reservation(r) => sqlx::query(
            r#"
            UPDATE inventory_reservations
            SET qty = $2, reason = $3, released_at = $4, version = version + 1
            WHERE id = $1 AND version = $5
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.qty)
        .bind(&r.reason)
        .bind(r.released_at),
        Record::Order(r) => sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, updated_at = $3, delivered_at = $4, version = version + 1
            WHERE id = $1 AND version = $5
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(r.status.as_str())
        .bind(r.updated_at)
        .bind(r.delivered_at),
        Record::Shipment(r) => sqlx::query(
            r#"
            UPDATE shipments
            SET carrier = $2, status = $3, estimated_delivery_date = $4, last_update_at = $5,
                version = version + 1
            WHERE id = $1 AND version = $6
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(&r.carrier)
        .bind(r.status.as_str())
        .bind(r.estimated_delivery_date)
        .bind(r.last_update_at),
        Record::Return(r) => sqlx::query(
            r#"
            UPDATE returns
            SET details = $2, status = $3, resolved_at = $4, version = version + 1
            WHERE id = $1 AND version = $5
            "#,
        )
        .bind(r.id.as_uuid())
        .bind(&r.details)
        .bind(r.status.as_str())
        .bind(r.resolved_at),
        // Rejected by UnitOfWork::validate before we get here
        Record::Customer(_)
        | Record::OrderNote(_)
        | Record::ShipmentEvent(_)
        | Record::Policy(_)
        | Record::Ticket(_) => {
            return Ok(0);
        }
    };

    let result = query.bind(expected.as_i64()).execute(&mut *conn).await?;
    Ok(result.rows_affected())
}

/// Version currently stored for a mutable record; `initial` if the row is gone.
async fn stored_version(conn: &mut PgConnection, record: &Record) -> sqlx::Result<Version> {
    let version: Option<i64> = match record {
        Record::Inventory(r) => {
            sqlx::query_scalar("SELECT version FROM inventory WHERE sku = $1")
                .bind(r.sku.as_str())
                .fetch_optional(&mut *conn)
                .await?
        }
        _ => {
            let (table, id) = match record {
                Record::Reservation(r) => ("inventory_reservations", r.id.as_uuid()),
                Record::Order(r) => ("orders", r.id.as_uuid()),
                Record::Shipment(r) => ("shipments", r.id.as_uuid()),
                Record::Return(r) => ("returns", r.id.as_uuid()),
                _ => return Ok(Version::initial()),
            };
            sqlx::query_scalar(&format!("SELECT version FROM {table} WHERE id = $1"))
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
        }
    };
    Ok(version.map(Version::new).unwrap_or(Version::initial()))
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn commit(&self, unit: UnitOfWork) -> Result<()> {
        unit.validate()?;

        // Dropping the transaction on any early return rolls it back
        let mut tx = self.pool.begin().await?;

        for mutation in unit.mutations() {
            match mutation {
                Mutation::Insert(record) => {
                    insert_record(&mut *tx, record)
                        .await
                        .map_err(|e| map_write_error(record, e))?;
                }
                Mutation::Update { record, expected } => {
                    let touched = update_record(&mut *tx, record, *expected)
                        .await
                        .map_err(|e| map_write_error(record, e))?;

                    if touched == 0 {
                        let actual = stored_version(&mut *tx, record).await?;
                        return Err(LedgerStoreError::ConcurrencyConflict {
                            collection: record.collection(),
                            key: record.key(),
                            expected: *expected,
                            actual,
                        });
                    }
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn inventory_item(&self, sku: &Sku) -> Result<Option<Versioned<InventoryItem>>> {
        let row = sqlx::query(
            r#"
            SELECT sku, name, available_qty, reserved_qty, reorder_threshold, updated_at, version
            FROM inventory
            WHERE sku = $1
            "#,
        )
        .bind(sku.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_inventory).transpose()
    }

    async fn inventory_items(&self) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query(
            r#"
            SELECT sku, name, available_qty, reserved_qty, reorder_threshold, updated_at, version
            FROM inventory
            ORDER BY sku ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Self::row_to_inventory(row).map(Versioned::into_record))
            .collect()
    }

    async fn reservation(&self, id: ReservationId) -> Result<Option<Versioned<Reservation>>> {
        let row = sqlx::query(
            r#"
            SELECT id, sku, qty, reason, created_at, released_at, version
            FROM inventory_reservations
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_reservation).transpose()
    }

    async fn active_reservations(&self, sku: &Sku) -> Result<Vec<Reservation>> {
        let rows = sqlx::query(
            r#"
            SELECT id, sku, qty, reason, created_at, released_at, version
            FROM inventory_reservations
            WHERE sku = $1 AND released_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(sku.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Self::row_to_reservation(row).map(Versioned::into_record))
            .collect()
    }

    async fn customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(
            "SELECT id, email, name, country_code, tags, created_at FROM customers WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn customer_by_email(&self, email: &str) -> Result<Option<Customer>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, name, country_code, tags, created_at
            FROM customers
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_customer).transpose()
    }

    async fn order(&self, id: OrderId) -> Result<Option<Versioned<Order>>> {
        let row = sqlx::query(
            r#"
            SELECT id, customer_id, status, total_amount_cents, currency, items,
                   created_at, updated_at, delivered_at, version
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn orders_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, customer_id, status, total_amount_cents, currency, items,
                   created_at, updated_at, delivered_at, version
            FROM orders
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(customer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Self::row_to_order(row).map(Versioned::into_record))
            .collect()
    }

    async fn order_notes(&self, order_id: OrderId) -> Result<Vec<OrderNote>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, note, visibility, created_at
            FROM order_notes
            WHERE order_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_note).collect()
    }

    async fn shipment(&self, id: ShipmentId) -> Result<Option<Versioned<Shipment>>> {
        let row = sqlx::query(
            r#"
            SELECT id, order_id, carrier, tracking_id, status, estimated_delivery_date,
                   last_update_at, version
            FROM shipments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_shipment).transpose()
    }

    async fn shipment_by_tracking_id(
        &self,
        tracking_id: &str,
    ) -> Result<Option<Versioned<Shipment>>> {
        let row = sqlx::query(
            r#"
            SELECT id, order_id, carrier, tracking_id, status, estimated_delivery_date,
                   last_update_at, version
            FROM shipments
            WHERE tracking_id = $1
            "#,
        )
        .bind(tracking_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_shipment).transpose()
    }

    async fn shipments_for_order(&self, order_id: OrderId) -> Result<Vec<Shipment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, carrier, tracking_id, status, estimated_delivery_date,
                   last_update_at, version
            FROM shipments
            WHERE order_id = $1
            ORDER BY tracking_id ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Self::row_to_shipment(row).map(Versioned::into_record))
            .collect()
    }

    async fn shipment_events(&self, shipment_id: ShipmentId) -> Result<Vec<ShipmentEvent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, shipment_id, event_time, location, status, message
            FROM shipment_events
            WHERE shipment_id = $1
            ORDER BY event_time DESC, id DESC
            "#,
        )
        .bind(shipment_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_shipment_event).collect()
    }

    async fn return_request(&self, id: ReturnId) -> Result<Option<Versioned<ReturnRequest>>> {
        let row = sqlx::query(
            r#"
            SELECT id, order_id, reason_code, details, status, requested_at, resolved_at, version
            FROM returns
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_return).transpose()
    }

    async fn returns_for_order(&self, order_id: OrderId) -> Result<Vec<ReturnRequest>> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_id, reason_code, details, status, requested_at, resolved_at, version
            FROM returns
            WHERE order_id = $1
            ORDER BY requested_at ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Self::row_to_return(row).map(Versioned::into_record))
            .collect()
    }

    async fn policy(&self, country_code: &CountryCode) -> Result<Option<Policy>> {
        let row = sqlx::query(
            r#"
            SELECT country_code, refund_window_days, replacement_window_days, notes
            FROM policies
            WHERE country_code = $1
            "#,
        )
        .bind(country_code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_policy).transpose()
    }

    async fn ticket(&self, id: TicketId) -> Result<Option<Ticket>> {
        let row = sqlx::query(
            r#"
            SELECT id, type, priority, title, body, status, created_at
            FROM tickets
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_ticket).transpose()
    }
}
