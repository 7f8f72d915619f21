//! Domain types for the cohort report.
//!
//! This module provides:
//! - Identifier primitives: CustomerId, OrderId
//! - Customer and Order records as read from the store
//! - CohortKey (ISO year/week) and the fixed TimeBand columns

pub mod cohort_key;
pub mod customer;
pub mod primitives;
pub mod time_band;

pub use cohort_key::{CohortKey, CohortKeyError};
pub use customer::{sort_orders, Customer, Order};
pub use primitives::{datetime_from_ms, CustomerId, OrderId};
pub use time_band::TimeBand;
