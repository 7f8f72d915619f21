//! Store abstraction for reading customers with orders and persisting flags.

use crate::domain::{Customer, OrderId};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod mock;

pub use mock::MockStore;

/// Customer/order store used by the report.
#[async_trait]
pub trait CustomerStore: Send + Sync + fmt::Debug {
    /// Fetch every customer that has at least one order, with their orders.
    ///
    /// # Returns
    /// Customers ordered by id; each customer's orders ordered by
    /// (created, id). Customers without orders are excluded.
    async fn fetch_customers_with_orders(&self) -> Result<Vec<Customer>, StoreError>;

    /// Set the first-order flag of a single order.
    async fn set_first_order(&self, order_id: OrderId, first_order: bool)
        -> Result<(), StoreError>;
}

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("order {0} not found")]
    OrderNotFound(OrderId),
    #[error("invalid stored value: {0}")]
    InvalidData(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
