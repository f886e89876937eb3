//! Shared application state.

use domain::{
    InventoryService, OrderService, PolicyResolver, ReturnService, ShipmentService, TicketService,
};
use ledger_store::LedgerStore;

/// Services available to every handler, all backed by the same store.
pub struct AppState<S: LedgerStore> {
    pub inventory: InventoryService<S>,
    pub shipments: ShipmentService<S>,
    pub returns: ReturnService<S>,
    pub policies: PolicyResolver<S>,
    pub orders: OrderService<S>,
    pub tickets: TicketService<S>,
}

impl<S: LedgerStore + Clone> AppState<S> {
    pub fn new(store: S) -> Self {
        Self {
            inventory: InventoryService::new(store.clone()),
            shipments: ShipmentService::new(store.clone()),
            returns: ReturnService::new(store.clone()),
            policies: PolicyResolver::new(store.clone()),
            orders: OrderService::new(store.clone()),
            tickets: TicketService::new(store),
        }
    }
}
