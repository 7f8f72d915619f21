//! Distinct-orderer and first-order aggregates per (cohort, band).

use super::bucketing::BucketedCohort;
use crate::domain::{CohortKey, Customer, CustomerId, Order, TimeBand};
use std::collections::{BTreeMap, HashSet};

/// Aggregates for one band of one cohort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandSummary {
    /// `"{pct}% orderers ({count})"`
    pub distinct_user_count: String,
    /// `"{pct}% 1st time ({count})"`
    pub first_order_count: String,
    pub distinct_users: usize,
    pub first_orders: usize,
}

/// A cohort with per-band aggregates. Bands without orders are absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CohortSummary {
    pub key: CohortKey,
    pub customer_count: usize,
    pub customers: Vec<Customer>,
    pub bands: BTreeMap<TimeBand, BandSummary>,
}

/// `count` as a whole-number percentage of `total`, rounded half up.
pub fn percent_of(count: usize, total: usize) -> u64 {
    if total == 0 {
        return 0;
    }
    (count as f64 * 100.0 / total as f64).round() as u64
}

pub fn get_distinct_user_and_order_count(cohorts: Vec<BucketedCohort>) -> Vec<CohortSummary> {
    cohorts
        .into_iter()
        .map(|cohort| {
            let total = cohort.customer_count;
            let bands = cohort
                .orders
                .into_iter()
                .map(|(band, orders)| (band, summarize_band(&orders, total)))
                .collect();
            CohortSummary {
                key: cohort.key,
                customer_count: total,
                customers: cohort.customers,
                bands,
            }
        })
        .collect()
}

fn summarize_band(orders: &[Order], cohort_size: usize) -> BandSummary {
    let distinct_users = orders
        .iter()
        .map(|o| o.customer_id)
        .collect::<HashSet<CustomerId>>()
        .len();
    let first_orders = orders.iter().filter(|o| o.first_order).count();

    BandSummary {
        distinct_user_count: format!(
            "{}% orderers ({})",
            percent_of(distinct_users, cohort_size),
            distinct_users
        ),
        first_order_count: format!(
            "{}% 1st time ({})",
            percent_of(first_orders, cohort_size),
            first_orders
        ),
        distinct_users,
        first_orders,
    }
}
