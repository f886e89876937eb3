//! Per-country return policy lookup.

use chrono::{DateTime, Duration, Utc};
use common::{CountryCode, OrderId};
use ledger_store::{LedgerStore, Policy};
use serde::Serialize;

use crate::error::{DomainError, Result};

/// Where an order stands relative to its country's return windows.
///
/// Advisory only. The return lifecycle never consults it; callers decide
/// whether to proceed, and may grant VIP exceptions outside the window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnWindow {
    pub order_id: OrderId,
    pub country_code: CountryCode,
    pub delivered_at: Option<DateTime<Utc>>,
    /// Whole days since delivery, `None` while the order is undelivered.
    /// Window checks use the exact elapsed time, so a partial day past the
    /// last allowed day is already outside.
    pub days_since_delivery: Option<i64>,
    pub refund_window_days: i64,
    pub replacement_window_days: i64,
    pub within_refund_window: bool,
    pub within_replacement_window: bool,
    pub vip_exception_eligible: bool,
    pub policy_notes: String,
}

#[derive(Clone)]
pub struct PolicyResolver<S: LedgerStore> {
    store: S,
}

impl<S: LedgerStore> PolicyResolver<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Finds the policy for a country. Case-insensitive.
    #[tracing::instrument(skip(self))]
    pub async fn lookup(&self, country: &str) -> Result<Policy> {
        let code = CountryCode::new(country);
        if code.as_str().is_empty() {
            return Err(DomainError::validation("country is required"));
        }

        self.store
            .policy(&code)
            .await?
            .ok_or(DomainError::NotFound("Policy not found for this country"))
    }

    /// Evaluates an order's return windows as of `now`.
    ///
    /// The window opens at delivery, so undelivered orders are inside both.
    #[tracing::instrument(skip(self))]
    pub async fn return_window(
        &self,
        order_id: OrderId,
        now: DateTime<Utc>,
    ) -> Result<ReturnWindow> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or(DomainError::NotFound("Order not found"))?
            .into_record();
        let customer = self
            .store
            .customer(order.customer_id)
            .await?
            .ok_or(DomainError::NotFound("Customer not found"))?;
        let policy = self
            .store
            .policy(&customer.country_code)
            .await?
            .ok_or(DomainError::NotFound("Policy not found for this country"))?;

        let elapsed = order.delivered_at.map(|delivered| now - delivered);
        let days_since_delivery = elapsed.map(|elapsed| elapsed.num_days().max(0));
        let within = |window: i64| elapsed.is_none_or(|elapsed| elapsed <= Duration::days(window));

        Ok(ReturnWindow {
            order_id,
            country_code: policy.country_code,
            delivered_at: order.delivered_at,
            days_since_delivery,
            refund_window_days: policy.refund_window_days,
            replacement_window_days: policy.replacement_window_days,
            within_refund_window: within(policy.refund_window_days),
            within_replacement_window: within(policy.replacement_window_days),
            vip_exception_eligible: customer.is_vip(),
            policy_notes: policy.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use common::{CustomerId, Money, OrderStatus};
    use ledger_store::{Customer, InMemoryLedgerStore, Order, UnitOfWork};

    use super::*;

    async fn resolver_with_order(
        delivered_days_ago: Option<i64>,
        tags: &[&str],
    ) -> (PolicyResolver<InMemoryLedgerStore>, OrderId) {
        let store = InMemoryLedgerStore::new();
        let now = Utc::now();
        let customer = Customer {
            id: CustomerId::new(),
            email: "hans.mueller@example.de".to_string(),
            name: "Hans Mueller".to_string(),
            country_code: CountryCode::new("DE"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: now,
        };
        let order = Order {
            id: OrderId::new(),
            customer_id: customer.id,
            status: if delivered_days_ago.is_some() {
                OrderStatus::Delivered
            } else {
                OrderStatus::Shipped
            },
            total_amount: Money::from_cents(8999),
            currency: "EUR".to_string(),
            items: vec![],
            created_at: now - Duration::days(60),
            updated_at: now,
            delivered_at: delivered_days_ago.map(|d| now - Duration::days(d)),
        };
        let policy = Policy {
            country_code: CountryCode::new("DE"),
            refund_window_days: 14,
            replacement_window_days: 30,
            notes: "EU 14-day withdrawal right".to_string(),
        };
        let order_id = order.id;
        store
            .commit(
                UnitOfWork::new()
                    .insert(customer)
                    .insert(order)
                    .insert(policy),
            )
            .await
            .unwrap();
        (PolicyResolver::new(store), order_id)
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let (resolver, _) = resolver_with_order(None, &[]).await;
        let policy = resolver.lookup("de").await.unwrap();
        assert_eq!(policy.refund_window_days, 14);
    }

    #[tokio::test]
    async fn unknown_country_is_not_found() {
        let (resolver, _) = resolver_with_order(None, &[]).await;
        assert!(matches!(
            resolver.lookup("ZZ").await,
            Err(DomainError::NotFound("Policy not found for this country"))
        ));
        assert!(matches!(
            resolver.lookup(" ").await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn window_between_refund_and_replacement() {
        let (resolver, order_id) = resolver_with_order(Some(20), &["vip"]).await;
        let window = resolver.return_window(order_id, Utc::now()).await.unwrap();

        assert_eq!(window.days_since_delivery, Some(20));
        assert!(!window.within_refund_window);
        assert!(window.within_replacement_window);
        assert!(window.vip_exception_eligible);
    }

    #[tokio::test]
    async fn undelivered_order_is_inside_window() {
        let (resolver, order_id) = resolver_with_order(None, &[]).await;
        let window = resolver.return_window(order_id, Utc::now()).await.unwrap();

        assert_eq!(window.days_since_delivery, None);
        assert!(window.within_refund_window);
        assert!(window.within_replacement_window);
        assert!(!window.vip_exception_eligible);
    }

    #[tokio::test]
    async fn partial_day_past_the_window_is_outside() {
        let (resolver, order_id) = resolver_with_order(Some(14), &[]).await;
        let delivered = resolver
            .return_window(order_id, Utc::now())
            .await
            .unwrap()
            .delivered_at
            .unwrap();

        let last_moment = resolver
            .return_window(order_id, delivered + Duration::days(14))
            .await
            .unwrap();
        assert_eq!(last_moment.days_since_delivery, Some(14));
        assert!(last_moment.within_refund_window);

        let late = resolver
            .return_window(order_id, delivered + Duration::days(14) + Duration::hours(23))
            .await
            .unwrap();
        assert_eq!(late.days_since_delivery, Some(14));
        assert!(!late.within_refund_window);
        assert!(late.within_replacement_window);
    }
}
