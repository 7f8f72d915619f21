//! Repository layer for database operations.

use crate::domain::{datetime_from_ms, Customer, CustomerId, Order, OrderId};
use crate::store::{CustomerStore, StoreError};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::time::Duration;
use tracing::{debug, warn};

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Insert customers in a single transaction. Existing ids are left untouched.
    ///
    /// Returns the number of newly inserted customers.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn insert_customers_batch(&self, customers: &[Customer]) -> Result<usize, sqlx::Error> {
        if customers.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0usize;
        let mut tx = self.pool.begin().await?;

        for customer in customers {
            let result = sqlx::query(
                r#"
                INSERT INTO customers (id, created_ms)
                VALUES (?, ?)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(customer.id.as_i64())
            .bind(customer.created.timestamp_millis())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Insert orders in a single transaction. Existing ids are left untouched.
    ///
    /// Returns the number of newly inserted orders.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn insert_orders_batch(&self, orders: &[Order]) -> Result<usize, sqlx::Error> {
        if orders.is_empty() {
            return Ok(0);
        }

        let mut inserted = 0usize;
        let mut tx = self.pool.begin().await?;

        for order in orders {
            let result = sqlx::query(
                r#"
                INSERT INTO orders (id, order_number, user_id, created_ms, first_order)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO NOTHING
                "#,
            )
            .bind(order.id.as_i64())
            .bind(order.order_number)
            .bind(order.customer_id.as_i64())
            .bind(order.created.timestamp_millis())
            .bind(order.first_order)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                inserted += 1;
            }
        }

        tx.commit().await?;
        Ok(inserted)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Fetch a single order by id.
    ///
    /// # Errors
    /// Returns an error if the query fails or the row holds an invalid timestamp.
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(
            "SELECT id, order_number, user_id, created_ms, first_order FROM orders WHERE id = ?",
        )
        .bind(order_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| order_from_row(&r, "id", "created_ms")).transpose()
    }

    /// Number of orders flagged as first order for a customer.
    pub async fn count_first_orders(&self, customer_id: CustomerId) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM orders WHERE user_id = ? AND first_order = 1",
        )
        .bind(customer_id.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("n"))
    }

    async fn update_first_order(&self, order_id: OrderId, first_order: bool) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE orders SET first_order = ? WHERE id = ?")
            .bind(first_order)
            .bind(order_id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(order_id));
        }
        Ok(())
    }
}

fn order_from_row(row: &SqliteRow, id_col: &str, created_col: &str) -> Result<Order, StoreError> {
    let id: i64 = row.get(id_col);
    let created_ms: i64 = row.get(created_col);
    let created = datetime_from_ms(created_ms).ok_or_else(|| {
        StoreError::InvalidData(format!("order {} has created_ms {} out of range", id, created_ms))
    })?;

    Ok(Order {
        id: OrderId::new(id),
        order_number: row.get("order_number"),
        customer_id: CustomerId::new(row.get("user_id")),
        created,
        first_order: row.get("first_order"),
    })
}

/// SQLite lock contention is worth retrying; everything else is permanent.
fn is_transient(err: &StoreError) -> bool {
    match err {
        StoreError::Db(sqlx::Error::PoolTimedOut) => true,
        StoreError::Db(sqlx::Error::Database(db)) => {
            let message = db.message();
            message.contains("database is locked") || message.contains("database is busy")
        }
        _ => false,
    }
}

#[async_trait]
impl CustomerStore for Repository {
    async fn fetch_customers_with_orders(&self) -> Result<Vec<Customer>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT c.id AS customer_id, c.created_ms AS customer_created_ms,
                   o.id AS order_id, o.order_number, o.user_id,
                   o.created_ms AS order_created_ms, o.first_order
            FROM customers c
            INNER JOIN orders o ON o.user_id = c.id
            ORDER BY c.id ASC, o.created_ms ASC, o.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut customers: Vec<Customer> = Vec::new();
        for row in &rows {
            let customer_id = CustomerId::new(row.get("customer_id"));
            let order = order_from_row(row, "order_id", "order_created_ms")?;

            // rows arrive grouped by customer
            if let Some(current) = customers.last_mut().filter(|c| c.id == customer_id) {
                current.orders.push(order);
                continue;
            }

            let created_ms: i64 = row.get("customer_created_ms");
            let created = datetime_from_ms(created_ms).ok_or_else(|| {
                StoreError::InvalidData(format!(
                    "customer {} has created_ms {} out of range",
                    customer_id, created_ms
                ))
            })?;
            customers.push(Customer::new(customer_id, created).with_orders(vec![order]));
        }

        debug!(
            customers = customers.len(),
            orders = rows.len(),
            "Fetched customers with orders"
        );
        Ok(customers)
    }

    async fn set_first_order(
        &self,
        order_id: OrderId,
        first_order: bool,
    ) -> Result<(), StoreError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(5)),
            ..Default::default()
        };

        retry(backoff, || async move {
            self.update_first_order(order_id, first_order)
                .await
                .map_err(|e| {
                    if is_transient(&e) {
                        warn!(order_id = %order_id, error = %e, "First-order update contended, retrying");
                        backoff::Error::transient(e)
                    } else {
                        backoff::Error::permanent(e)
                    }
                })
        })
        .await
    }
}
