pub mod error;
pub mod memory;
pub mod postgres;
pub mod records;
pub mod store;
pub mod unit_of_work;
pub mod version;

pub use error::{LedgerStoreError, Result};
pub use memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;
pub use records::{
    Customer, InventoryItem, Order, OrderItem, OrderNote, Policy, Record, Reservation,
    ReturnRequest, Shipment, ShipmentEvent, Ticket,
};
pub use store::{LedgerStore, LedgerStoreExt};
pub use unit_of_work::{Mutation, UnitOfWork};
pub use version::{Version, Versioned};
