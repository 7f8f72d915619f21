//! Customer and Order records as supplied by the store.

use super::primitives::{CustomerId, OrderId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A customer together with the orders they own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    /// When the customer joined; determines the cohort.
    pub created: DateTime<Utc>,
    pub orders: Vec<Order>,
}

impl Customer {
    pub fn new(id: CustomerId, created: DateTime<Utc>) -> Self {
        Self {
            id,
            created,
            orders: Vec::new(),
        }
    }

    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.orders = orders;
        self
    }

    /// Number of orders currently flagged as the customer's first order.
    pub fn flagged_first_orders(&self) -> usize {
        self.orders.iter().filter(|o| o.first_order).count()
    }
}

/// A single order placed by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub order_number: Option<i64>,
    pub customer_id: CustomerId,
    pub created: DateTime<Utc>,
    pub first_order: bool,
}

impl Order {
    pub fn new(id: OrderId, customer_id: CustomerId, created: DateTime<Utc>) -> Self {
        Self {
            id,
            order_number: None,
            customer_id,
            created,
            first_order: false,
        }
    }
}

/// Sort orders ascending by creation time, lowest id first on ties.
pub fn sort_orders(orders: &mut [Order]) {
    orders.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
}
