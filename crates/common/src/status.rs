//! Status and classification enums stored on ledger records.
//!
//! Every enum round-trips through the snake_case names used on the wire and
//! in the database (`in_transit`, `changed_mind`, ...).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a string is not one of an enum's recognized values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field}. Must be one of: {}", .expected.join(", "))]
pub struct ParseEnumError {
    /// Name of the field being parsed, e.g. `"status"`.
    pub field: &'static str,
    /// The rejected input.
    pub value: String,
    /// All accepted values.
    pub expected: &'static [&'static str],
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, field = $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every recognized value, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            const NAMES: &'static [&'static str] = &[$($wire),+];

            /// Returns the wire name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        field: $field,
                        value: other.to_string(),
                        expected: $name::NAMES,
                    }),
                }
            }
        }
    };
}

wire_enum! {
    /// Order status. Progression is owned by fulfillment outside the ledger core.
    OrderStatus, field = "status" {
        Created => "created",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

wire_enum! {
    /// Carrier-reported shipment status.
    ///
    /// ```text
    /// label_created ──► in_transit ──┬──► delayed ──────────┬──► delivered
    ///                                └──► out_for_delivery ─┘
    /// any non-terminal ──► exception ──► in_transit | delivered
    /// ```
    ///
    /// Transitions are recorded, not enforced: carrier feeds arrive out of
    /// order and with corrections.
    ShipmentStatus, field = "status" {
        LabelCreated => "label_created",
        InTransit => "in_transit",
        Delayed => "delayed",
        OutForDelivery => "out_for_delivery",
        Delivered => "delivered",
        Exception => "exception",
    }
}

wire_enum! {
    /// Lifecycle of a return request.
    ///
    /// ```text
    /// requested ──► approved ──► received ──► refunded
    ///     │             │                        ▲
    ///     └─────────────┼──► received            │
    ///                   └────────────────────────┘
    /// ```
    ReturnStatus, field = "status" {
        Requested => "requested",
        Approved => "approved",
        Received => "received",
        /// Terminal.
        Refunded => "refunded",
    }
}

wire_enum! {
    /// Why the customer is returning the order.
    ReturnReason, field = "reason_code" {
        WrongItem => "wrong_item",
        Damaged => "damaged",
        Late => "late",
        ChangedMind => "changed_mind",
    }
}

wire_enum! {
    /// Who may see an order note.
    NoteVisibility, field = "visibility" {
        Internal => "internal",
        Public => "public",
    }
}

wire_enum! {
    /// Team an operations ticket is routed to.
    TicketType, field = "type" {
        Warehouse => "warehouse",
        Carrier => "carrier",
        Billing => "billing",
        Support => "support",
    }
}

wire_enum! {
    TicketPriority, field = "priority" {
        Low => "low",
        #[serde(rename = "med")]
        Medium => "med",
        High => "high",
    }
}

wire_enum! {
    /// Where a ticket stands. Tickets are opened here and worked elsewhere.
    TicketStatus, field = "status" {
        Open => "open",
        InProgress => "in_progress",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        assert_eq!(
            "out_for_delivery".parse::<ShipmentStatus>().unwrap(),
            ShipmentStatus::OutForDelivery
        );
        assert_eq!(
            "changed_mind".parse::<ReturnReason>().unwrap(),
            ReturnReason::ChangedMind
        );
        assert_eq!(
            "internal".parse::<NoteVisibility>().unwrap(),
            NoteVisibility::Internal
        );
    }

    #[test]
    fn rejects_unknown_values_listing_accepted_ones() {
        let err = "lost".parse::<ShipmentStatus>().unwrap_err();
        assert_eq!(err.value, "lost");
        assert_eq!(
            err.to_string(),
            "Invalid status. Must be one of: label_created, in_transit, delayed, \
             out_for_delivery, delivered, exception"
        );

        let err = "broken".parse::<ReturnReason>().unwrap_err();
        assert!(err.to_string().starts_with("Invalid reason_code."));

        let err = "medium".parse::<TicketPriority>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid priority. Must be one of: low, med, high");
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("Delivered".parse::<ShipmentStatus>().is_err());
    }

    #[test]
    fn display_matches_serde_name() {
        for status in ReturnStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
        }
        assert_eq!(ShipmentStatus::ALL.len(), 6);
        assert_eq!(
            serde_json::to_string(&TicketPriority::Medium).unwrap(),
            "\"med\""
        );
    }
}
