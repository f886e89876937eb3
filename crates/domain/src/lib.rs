//! Fulfillment core.
//!
//! Services over a [`ledger_store::LedgerStore`]:
//! - [`InventoryService`] reserves and releases stock without overselling
//! - [`ShipmentService`] appends tracking events and keeps the cached status
//! - [`ReturnService`] drives the return/refund lifecycle
//! - [`PolicyResolver`] looks up per-country return windows
//! - [`OrderService`] serves order and customer lookups and notes
//! - [`TicketService`] opens operations tickets
//!
//! Read-modify-write operations retry transparently on version conflicts.

pub mod error;
pub mod inventory;
pub mod orders;
pub mod policy;
pub mod returns;
mod retry;
pub mod shipment;
pub mod tickets;

pub use error::{DomainError, Result};
pub use inventory::{InventoryService, LedgerAudit, ReservationOutcome, StockView};
pub use orders::{OrderDetails, OrderService};
pub use policy::{PolicyResolver, ReturnWindow};
pub use returns::{ReturnAction, ReturnService};
pub use shipment::{RecordedEvent, ShipmentService, ShipmentWithEvents, TrackingDetails};
pub use tickets::TicketService;
