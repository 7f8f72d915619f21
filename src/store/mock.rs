//! In-memory store for testing without a database.

use super::{CustomerStore, StoreError};
use crate::domain::{sort_orders, Customer, OrderId};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Mock store holding customers in memory, with injectable failures.
#[derive(Debug, Default)]
pub struct MockStore {
    customers: Mutex<Vec<Customer>>,
    fetch_failure: Option<String>,
    failing_orders: HashSet<OrderId>,
    writes: Mutex<Vec<(OrderId, bool)>>,
}

impl MockStore {
    /// Create a new mock store with no data.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a customer (with their orders).
    pub fn with_customer(self, customer: Customer) -> Self {
        self.with_customers(vec![customer])
    }

    /// Add multiple customers.
    pub fn with_customers(mut self, customers: Vec<Customer>) -> Self {
        self.customers
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend(customers);
        self
    }

    /// Make every fetch fail with the given message.
    pub fn with_fetch_failure(mut self, message: impl Into<String>) -> Self {
        self.fetch_failure = Some(message.into());
        self
    }

    /// Make writes to this order fail.
    pub fn with_failing_order(mut self, order_id: OrderId) -> Self {
        self.failing_orders.insert(order_id);
        self
    }

    /// Every successful flag write, in the order it happened.
    pub fn writes(&self) -> Vec<(OrderId, bool)> {
        lock(&self.writes).clone()
    }

    /// Current state of all stored customers.
    pub fn customers(&self) -> Vec<Customer> {
        lock(&self.customers).clone()
    }
}

/// A panicking test thread must not hide the data it left behind.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl CustomerStore for MockStore {
    async fn fetch_customers_with_orders(&self) -> Result<Vec<Customer>, StoreError> {
        if let Some(message) = &self.fetch_failure {
            return Err(StoreError::Unavailable(message.clone()));
        }

        let stored = lock(&self.customers);
        let mut customers: Vec<Customer> = stored
            .iter()
            .filter(|c| !c.orders.is_empty())
            .cloned()
            .collect();
        customers.sort_by_key(|c| c.id);
        for customer in &mut customers {
            sort_orders(&mut customer.orders);
        }
        Ok(customers)
    }

    async fn set_first_order(
        &self,
        order_id: OrderId,
        first_order: bool,
    ) -> Result<(), StoreError> {
        if self.failing_orders.contains(&order_id) {
            return Err(StoreError::Unavailable(format!(
                "write to order {} rejected",
                order_id
            )));
        }

        let mut stored = lock(&self.customers);
        let order = stored
            .iter_mut()
            .flat_map(|c| c.orders.iter_mut())
            .find(|o| o.id == order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;
        order.first_order = first_order;
        drop(stored);

        lock(&self.writes).push((order_id, first_order));
        Ok(())
    }
}
