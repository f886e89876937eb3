//! Shared types for the fulfillment ledger.

mod ids;
pub mod status;
mod values;

pub use ids::{
    CustomerId, NoteId, OrderId, ReservationId, ReturnId, ShipmentEventId, ShipmentId, TicketId,
};
pub use status::{
    NoteVisibility, OrderStatus, ParseEnumError, ReturnReason, ReturnStatus, ShipmentStatus,
    TicketPriority, TicketStatus, TicketType,
};
pub use values::{CountryCode, Money, Sku};
