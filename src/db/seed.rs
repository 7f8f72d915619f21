//! Loading sample customers and orders from CSV files.

use super::Repository;
use crate::domain::{Customer, CustomerId, Order, OrderId};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("csv parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid timestamp {0:?}")]
    Timestamp(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub customers_inserted: usize,
    pub orders_inserted: usize,
}

#[derive(Debug, serde::Deserialize)]
struct CustomerRow {
    id: i64,
    created: String,
}

#[derive(Debug, serde::Deserialize)]
struct OrderRow {
    id: i64,
    order_number: Option<i64>,
    user_id: i64,
    created: String,
}

/// Parse a UTC timestamp as RFC 3339, `YYYY-MM-DD HH:MM:SS[.fff]` or `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, SeedError> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| SeedError::Timestamp(raw.to_string()))
}

/// Parse a customers CSV with columns `id,created`.
pub fn parse_customers_csv<R: Read>(reader: R) -> Result<Vec<Customer>, SeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut customers = Vec::new();
    for record in reader.deserialize::<CustomerRow>() {
        let row = record?;
        customers.push(Customer::new(
            CustomerId::new(row.id),
            parse_timestamp(&row.created)?,
        ));
    }
    Ok(customers)
}

/// Parse an orders CSV with columns `id,order_number,user_id,created`.
pub fn parse_orders_csv<R: Read>(reader: R) -> Result<Vec<Order>, SeedError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut orders = Vec::new();
    for record in reader.deserialize::<OrderRow>() {
        let row = record?;
        let mut order = Order::new(
            OrderId::new(row.id),
            CustomerId::new(row.user_id),
            parse_timestamp(&row.created)?,
        );
        order.order_number = row.order_number;
        orders.push(order);
    }
    Ok(orders)
}

fn open(path: &Path) -> Result<File, SeedError> {
    File::open(path).map_err(|source| SeedError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load both CSV files into the database. Rows whose id already exists are skipped.
pub async fn seed_from_csv(
    repo: &Repository,
    customers_csv: &Path,
    orders_csv: &Path,
) -> Result<SeedSummary, SeedError> {
    let customers = parse_customers_csv(open(customers_csv)?)?;
    let orders = parse_orders_csv(open(orders_csv)?)?;

    let summary = SeedSummary {
        customers_inserted: repo.insert_customers_batch(&customers).await?,
        orders_inserted: repo.insert_orders_batch(&orders).await?,
    };

    info!(
        customers_read = customers.len(),
        orders_read = orders.len(),
        customers_inserted = summary.customers_inserted,
        orders_inserted = summary.orders_inserted,
        "Seeded sample data"
    );
    Ok(summary)
}
