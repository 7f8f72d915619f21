use crate::domain::{sort_orders, Customer, CustomerId, OrderId};
use crate::engine::{apply_writes, plan_first_order_updates, FirstOrderPlan};
use crate::store::CustomerStore;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Persists first-order flags, one concurrent unit of work per customer.
///
/// Each customer's writes touch only that customer's orders, so units never
/// contend for the same row.
#[derive(Debug, Clone)]
pub struct FirstOrderMarker {
    store: Arc<dyn CustomerStore>,
    concurrency: usize,
}

/// A flag write that could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistFailure {
    pub customer_id: CustomerId,
    pub order_id: OrderId,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkOutcome {
    /// Customers whose plan was fully written.
    pub customers_updated: usize,
    pub orders_written: usize,
    pub failures: Vec<PersistFailure>,
}

impl MarkOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

struct CustomerResult {
    customer_id: CustomerId,
    written: Vec<(OrderId, bool)>,
    failure: Option<PersistFailure>,
}

impl FirstOrderMarker {
    pub fn new(store: Arc<dyn CustomerStore>, concurrency: usize) -> Self {
        Self {
            store,
            concurrency: concurrency.max(1),
        }
    }

    /// Sort each customer's orders and flag the earliest as the first order.
    ///
    /// Writes that succeed are mirrored onto `customers`; a failed write stops
    /// only its own customer's remaining writes.
    pub async fn mark(&self, customers: &mut [Customer]) -> MarkOutcome {
        for customer in customers.iter_mut() {
            sort_orders(&mut customer.orders);
        }

        let plans = plan_first_order_updates(customers);
        if plans.is_empty() {
            tracing::debug!("First orders already marked");
            return MarkOutcome::default();
        }

        let results: Vec<CustomerResult> = stream::iter(plans)
            .map(|plan| self.persist_plan(plan))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let index: HashMap<CustomerId, usize> = customers
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        let mut outcome = MarkOutcome::default();
        for result in results {
            if let Some(&i) = index.get(&result.customer_id) {
                apply_writes(&mut customers[i].orders, &result.written);
            }
            outcome.orders_written += result.written.len();
            match result.failure {
                Some(failure) => outcome.failures.push(failure),
                None => outcome.customers_updated += 1,
            }
        }
        outcome
            .failures
            .sort_by_key(|f| (f.customer_id, f.order_id));

        tracing::info!(
            customers_updated = outcome.customers_updated,
            orders_written = outcome.orders_written,
            failures = outcome.failures.len(),
            "First-order marking finished"
        );
        outcome
    }

    async fn persist_plan(&self, plan: FirstOrderPlan) -> CustomerResult {
        let mut written = Vec::new();
        for (order_id, value) in plan.writes() {
            if let Err(e) = self.store.set_first_order(order_id, value).await {
                tracing::warn!(
                    customer_id = %plan.customer_id,
                    order_id = %order_id,
                    error = %e,
                    "Failed to persist first-order flag"
                );
                return CustomerResult {
                    customer_id: plan.customer_id,
                    written,
                    failure: Some(PersistFailure {
                        customer_id: plan.customer_id,
                        order_id,
                        message: e.to_string(),
                    }),
                };
            }
            written.push((order_id, value));
        }

        CustomerResult {
            customer_id: plan.customer_id,
            written,
            failure: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Order;
    use crate::store::MockStore;
    use chrono::{TimeZone, Utc};

    fn customer(id: i64, orders: &[(i64, u32, bool)]) -> Customer {
        let cid = CustomerId::new(id);
        Customer::new(cid, Utc.with_ymd_and_hms(2020, 1, 6, 0, 0, 0).unwrap()).with_orders(
            orders
                .iter()
                .map(|(oid, day, first)| {
                    let mut o = Order::new(
                        OrderId::new(*oid),
                        cid,
                        Utc.with_ymd_and_hms(2020, 1, *day, 12, 0, 0).unwrap(),
                    );
                    o.first_order = *first;
                    o
                })
                .collect(),
        )
    }

    fn sample() -> Vec<Customer> {
        vec![
            customer(1, &[(11, 20, false), (10, 9, false)]),
            customer(2, &[(20, 11, false)]),
            customer(3, &[(30, 8, false), (31, 9, true)]),
        ]
    }

    #[tokio::test]
    async fn test_marks_earliest_and_persists() {
        let store = Arc::new(MockStore::new().with_customers(sample()));
        let marker = FirstOrderMarker::new(store.clone(), 4);
        let mut customers = store.fetch_customers_with_orders().await.unwrap();

        let outcome = marker.mark(&mut customers).await;
        assert!(outcome.is_complete());
        assert_eq!(outcome.customers_updated, 3);
        assert_eq!(outcome.orders_written, 4);

        for c in customers.iter().chain(store.customers().iter()) {
            assert_eq!(c.flagged_first_orders(), 1);
        }
        assert!(customers[0].orders[0].first_order);
        assert_eq!(customers[0].orders[0].id, OrderId::new(10));
    }

    #[tokio::test]
    async fn test_second_run_writes_nothing() {
        let store = Arc::new(MockStore::new().with_customers(sample()));
        let marker = FirstOrderMarker::new(store.clone(), 2);

        let mut first = store.fetch_customers_with_orders().await.unwrap();
        marker.mark(&mut first).await;
        let writes_after_first = store.writes().len();

        let mut second = store.fetch_customers_with_orders().await.unwrap();
        let outcome = marker.mark(&mut second).await;
        assert_eq!(outcome, MarkOutcome::default());
        assert_eq!(store.writes().len(), writes_after_first);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_customer() {
        let store = Arc::new(
            MockStore::new()
                .with_customers(sample())
                .with_failing_order(OrderId::new(20)),
        );
        let marker = FirstOrderMarker::new(store.clone(), 8);
        let mut customers = store.fetch_customers_with_orders().await.unwrap();

        let outcome = marker.mark(&mut customers).await;
        assert!(!outcome.is_complete());
        assert_eq!(outcome.customers_updated, 2);
        assert_eq!(
            outcome.failures,
            vec![PersistFailure {
                customer_id: CustomerId::new(2),
                order_id: OrderId::new(20),
                message: "store unavailable: write to order 20 rejected".to_string(),
            }]
        );

        assert!(customers[0].orders[0].first_order);
        assert!(!customers[1].orders[0].first_order);
        assert!(customers[2].orders[0].first_order);
    }

    #[tokio::test]
    async fn test_partial_writes_are_mirrored() {
        // Customer 3 needs a clear on 31 then a mark on 30; the mark fails.
        let store = Arc::new(
            MockStore::new()
                .with_customer(customer(3, &[(30, 8, false), (31, 9, true)]))
                .with_failing_order(OrderId::new(30)),
        );
        let marker = FirstOrderMarker::new(store.clone(), 1);
        let mut customers = store.fetch_customers_with_orders().await.unwrap();

        let outcome = marker.mark(&mut customers).await;
        assert_eq!(outcome.orders_written, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(customers[0].flagged_first_orders(), 0);
        assert_eq!(store.customers()[0].flagged_first_orders(), 0);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let store = Arc::new(MockStore::new().with_customers(sample()));
        let marker = FirstOrderMarker::new(store.clone(), 0);
        let mut customers = store.fetch_customers_with_orders().await.unwrap();
        assert!(marker.mark(&mut customers).await.is_complete());
    }
}
