pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod export;
pub mod orchestration;
pub mod store;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{CohortKey, Customer, CustomerId, Order, OrderId, TimeBand};
pub use engine::{build_report_rows, format_cohort_date, format_for_csv, ReportRow};
pub use error::AppError;
pub use orchestration::{ReportError, ReportOutcome, ReportService};
pub use store::{CustomerStore, MockStore, StoreError};
