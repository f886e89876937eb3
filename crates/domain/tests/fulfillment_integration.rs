//! Integration tests for the fulfillment core.
//!
//! These exercise the ledger invariants end to end against the in-memory
//! store, including concurrent callers on a multi-threaded runtime.

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{
    CountryCode, CustomerId, Money, OrderId, ReturnStatus, ShipmentId, ShipmentStatus, Sku,
};
use domain::{DomainError, InventoryService, ReturnService, ShipmentService};
use futures_util::future::join_all;
use ledger_store::{
    Customer, InMemoryLedgerStore, InventoryItem, LedgerStore, LedgerStoreExt, Order, OrderItem,
    Shipment, UnitOfWork,
};

async fn store_with_stock(items: &[(&str, i64)]) -> InMemoryLedgerStore {
    let store = InMemoryLedgerStore::new();
    store
        .insert_all(
            items
                .iter()
                .map(|(sku, qty)| InventoryItem::new(*sku, format!("{sku} item"), *qty)),
        )
        .await
        .unwrap();
    store
}

async fn assert_ledger_consistent(service: &InventoryService<InMemoryLedgerStore>, sku: &Sku) {
    let audit = service.audit(sku).await.unwrap();
    assert!(audit.available_qty >= 0, "available went negative: {audit:?}");
    assert!(audit.reserved_qty >= 0, "reserved went negative: {audit:?}");
    assert!(audit.consistent, "reserved pool drifted: {audit:?}");
}

/// Inserts a customer with one delivered order and returns the order id.
async fn seed_order(store: &InMemoryLedgerStore) -> OrderId {
    let customer = Customer {
        id: CustomerId::new(),
        email: format!("{}@example.com", CustomerId::new()),
        name: "Sarah Johnson".to_string(),
        country_code: CountryCode::new("US"),
        tags: vec![],
        created_at: Utc::now() - Duration::days(90),
    };
    let items = vec![OrderItem::new(
        "KEYBOARD-K5",
        "Mechanical Keyboard K5",
        1,
        Money::from_cents(12999),
    )];
    let order = Order {
        id: OrderId::new(),
        customer_id: customer.id,
        status: common::OrderStatus::Delivered,
        total_amount: items.iter().map(OrderItem::total_price).sum(),
        currency: "USD".to_string(),
        items,
        created_at: Utc::now() - Duration::days(7),
        updated_at: Utc::now() - Duration::days(2),
        delivered_at: Some(Utc::now() - Duration::days(2)),
    };
    let order_id = order.id;
    store
        .commit(UnitOfWork::new().insert(customer).insert(order))
        .await
        .unwrap();
    order_id
}

mod inventory {
    use super::*;

    #[tokio::test]
    async fn reserve_then_release_restores_counters() {
        let store = store_with_stock(&[("LAPTOP-X1", 50)]).await;
        let service = InventoryService::new(store);
        let sku = Sku::new("LAPTOP-X1");

        let before = service.get(&sku).await.unwrap().item;
        let reservation = service.reserve(&sku, 7, "replacement").await.unwrap().reservation;
        service.release(reservation.id).await.unwrap();
        let after = service.get(&sku).await.unwrap().item;

        assert_eq!(after.available_qty, before.available_qty);
        assert_eq!(after.reserved_qty, before.reserved_qty);
        assert_ledger_consistent(&service, &sku).await;
    }

    #[tokio::test]
    async fn headset_out_of_stock_scenario() {
        let store = store_with_stock(&[("HEADSET-Z3", 0)]).await;
        let service = InventoryService::new(store.clone());
        let sku = Sku::new("HEADSET-Z3");

        let err = service.reserve(&sku, 1, "replacement").await.unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_INVENTORY");
        assert_eq!(err.to_string(), "Only 0 units available");
        assert_eq!(store.reservation_count().await, 0);
    }

    #[tokio::test]
    async fn second_release_leaves_counters_alone() {
        let store = store_with_stock(&[("MOUSE-M4", 200)]).await;
        let service = InventoryService::new(store);
        let sku = Sku::new("MOUSE-M4");

        let reservation = service.reserve(&sku, 10, "hold").await.unwrap().reservation;
        service.release(reservation.id).await.unwrap();
        let after_first = service.get(&sku).await.unwrap().item;

        let err = service.release(reservation.id).await.unwrap_err();
        assert!(matches!(err, DomainError::AlreadyReleased { .. }));
        assert_eq!(err.code(), "ALREADY_RELEASED");

        let after_second = service.get(&sku).await.unwrap().item;
        assert_eq!(after_first.available_qty, after_second.available_qty);
        assert_eq!(after_first.reserved_qty, after_second.reserved_qty);
    }
}

mod concurrency {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn two_callers_cannot_oversell() {
        let store = store_with_stock(&[("PHONE-Y2", 10)]).await;
        let service = Arc::new(InventoryService::new(store));
        let sku = Sku::new("PHONE-Y2");

        let handles = [7, 8].map(|qty| {
            let service = Arc::clone(&service);
            let sku = sku.clone();
            tokio::spawn(async move { service.reserve(&sku, qty, "checkout").await })
        });
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let succeeded: i64 = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|r| r.reservation.qty)
            .sum();
        assert!(succeeded <= 10);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for failure in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(matches!(failure, DomainError::InsufficientInventory { .. }));
        }

        let item = service.get(&sku).await.unwrap().item;
        assert_eq!(item.available_qty, 10 - succeeded);
        assert_eq!(item.reserved_qty, succeeded);
        assert_ledger_consistent(&service, &sku).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn many_unit_reservations_admit_exactly_the_stock() {
        let store = store_with_stock(&[("CABLE-C7", 10)]).await;
        let service = Arc::new(InventoryService::new(store));
        let sku = Sku::new("CABLE-C7");

        let handles = (0..40).map(|i| {
            let service = Arc::clone(&service);
            let sku = sku.clone();
            tokio::spawn(async move { service.reserve(&sku, 1, &format!("caller {i}")).await })
        });
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 10);
        let item = service.get(&sku).await.unwrap().item;
        assert_eq!(item.available_qty, 0);
        assert_eq!(item.reserved_qty, 10);
        assert_ledger_consistent(&service, &sku).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_release_succeeds_once() {
        let store = store_with_stock(&[("MONITOR-27", 5)]).await;
        let service = Arc::new(InventoryService::new(store));
        let sku = Sku::new("MONITOR-27");
        let reservation = service.reserve(&sku, 3, "hold").await.unwrap().reservation;

        let handles = (0..8).map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.release(reservation.id).await })
        });
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| matches!(e, DomainError::AlreadyReleased { .. }))
        );

        let item = service.get(&sku).await.unwrap().item;
        assert_eq!(item.available_qty, 5);
        assert_eq!(item.reserved_qty, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn interleaved_reserve_and_release_keep_ledger_consistent() {
        let store = store_with_stock(&[("LAPTOP-X1", 20), ("HEADSET-Z3", 20)]).await;
        let service = Arc::new(InventoryService::new(store));

        let handles = (0..20).map(|i| {
            let service = Arc::clone(&service);
            let sku = Sku::new(if i % 2 == 0 { "LAPTOP-X1" } else { "HEADSET-Z3" });
            tokio::spawn(async move {
                let reservation = service.reserve(&sku, 3, "cycle").await?.reservation;
                if i % 3 == 0 {
                    service.release(reservation.id).await?;
                }
                Ok::<_, DomainError>(())
            })
        });
        for joined in join_all(handles).await {
            match joined.unwrap() {
                Ok(()) | Err(DomainError::InsufficientInventory { .. }) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        for sku in ["LAPTOP-X1", "HEADSET-Z3"] {
            let sku = Sku::new(sku);
            assert_ledger_consistent(&service, &sku).await;
            let item = service.get(&sku).await.unwrap().item;
            assert_eq!(item.on_hand(), 20);
        }
    }
}

mod shipments {
    use super::*;

    #[tokio::test]
    async fn delayed_event_keeps_history() {
        let store = InMemoryLedgerStore::new();
        let order_id = seed_order(&store).await;
        let shipment = Shipment {
            id: ShipmentId::new(),
            order_id,
            carrier: "FedEx".to_string(),
            tracking_id: "FX100200300".to_string(),
            status: ShipmentStatus::LabelCreated,
            estimated_delivery_date: Some(Utc::now() + Duration::days(2)),
            last_update_at: Utc::now(),
        };
        store.insert(shipment.clone()).await.unwrap();
        let service = ShipmentService::new(store);

        service
            .record_event(shipment.id, "label_created", "Label printed", None)
            .await
            .unwrap();
        service
            .record_event(shipment.id, "in_transit", "Departed hub", Some("Chicago, IL"))
            .await
            .unwrap();
        let delayed = service
            .record_event(shipment.id, "delayed", "Weather delay", Some("Chicago, IL"))
            .await
            .unwrap();

        assert_eq!(delayed.shipment.status, ShipmentStatus::Delayed);
        assert_eq!(delayed.shipment.last_update_at, delayed.event.event_time);

        let tracking = service.track("FX100200300").await.unwrap();
        assert_eq!(tracking.shipment.status, ShipmentStatus::Delayed);
        let statuses: Vec<_> = tracking.events.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                ShipmentStatus::Delayed,
                ShipmentStatus::InTransit,
                ShipmentStatus::LabelCreated
            ]
        );
        assert_eq!(tracking.events[1].message, "Departed hub");
    }

    #[tokio::test]
    async fn exception_can_resolve_to_delivered() {
        let store = InMemoryLedgerStore::new();
        let order_id = seed_order(&store).await;
        let shipment = Shipment {
            id: ShipmentId::new(),
            order_id,
            carrier: "DHL".to_string(),
            tracking_id: "DHL555".to_string(),
            status: ShipmentStatus::InTransit,
            estimated_delivery_date: None,
            last_update_at: Utc::now(),
        };
        store.insert(shipment.clone()).await.unwrap();
        let service = ShipmentService::new(store);

        for (status, message) in [
            ("exception", "Address issue"),
            ("in_transit", "Address corrected"),
            ("delivered", "Left at front door"),
        ] {
            service
                .record_event(shipment.id, status, message, None)
                .await
                .unwrap();
        }

        let shipments = service.for_order(order_id).await.unwrap();
        assert_eq!(shipments.len(), 1);
        assert_eq!(shipments[0].shipment.status, ShipmentStatus::Delivered);
        assert_eq!(shipments[0].events.len(), 3);
    }
}

mod returns {
    use super::*;

    async fn service() -> (ReturnService<InMemoryLedgerStore>, OrderId) {
        let store = InMemoryLedgerStore::new();
        let order_id = seed_order(&store).await;
        (ReturnService::new(store), order_id)
    }

    #[tokio::test]
    async fn refund_rejected_while_requested() {
        let (service, order_id) = service().await;
        let request = service
            .create(order_id, "damaged", Some("Box crushed"))
            .await
            .unwrap();
        assert_eq!(request.status, ReturnStatus::Requested);

        let err = service.refund(request.id).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_STATUS");
        assert_eq!(
            err.to_string(),
            "Cannot refund return with status: requested. Must be approved or received."
        );
    }

    #[tokio::test]
    async fn refund_after_approval() {
        let (service, order_id) = service().await;
        let request = service.create(order_id, "wrong_item", None).await.unwrap();

        service.approve(request.id).await.unwrap();
        let refunded = service.refund(request.id).await.unwrap();
        assert_eq!(refunded.status, ReturnStatus::Refunded);
        assert!(refunded.resolved_at.is_some());

        let err = service.refund(request.id).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidStatus { .. }));
    }

    #[tokio::test]
    async fn refund_after_receipt_without_approval() {
        let (service, order_id) = service().await;
        let request = service.create(order_id, "late", Some("  ")).await.unwrap();
        assert_eq!(request.details, None);

        let received = service.receive(request.id).await.unwrap();
        assert_eq!(received.status, ReturnStatus::Received);
        assert!(received.resolved_at.is_none());

        let refunded = service.refund(request.id).await.unwrap();
        assert!(refunded.resolved_at.is_some());
        assert_eq!(service.get(request.id).await.unwrap(), refunded);
    }

    #[tokio::test]
    async fn approve_only_from_requested() {
        let (service, order_id) = service().await;
        let request = service.create(order_id, "changed_mind", None).await.unwrap();
        service.receive(request.id).await.unwrap();

        let err = service.approve(request.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot approve return with status: received");
    }

    #[tokio::test]
    async fn create_validates_reason_before_order() {
        let (service, _) = service().await;

        let err = service
            .create(OrderId::new(), "broken", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(err.to_string().starts_with("Invalid reason_code. Must be one of:"));

        let err = service
            .create(OrderId::new(), "damaged", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound("Order not found")));
    }
}
