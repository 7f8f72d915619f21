//! Pure computation stages of the cohort report.
//!
//! Each stage consumes the previous stage's output:
//! split -> count -> bucket by elapsed days -> distinct counts -> rows.
//! First-order planning lives here too; persisting the plan is done by
//! the orchestration layer.

use crate::domain::{CohortKey, Customer, TimeBand};

pub mod bucketing;
pub mod cohorts;
pub mod distinct;
pub mod first_order;
pub mod rows;

pub use bucketing::{elapsed_days, group_orders_by_time_from_join, BucketError, BucketedCohort};
pub use cohorts::{count_customers_by_cohort, split_cohorts, Cohort, CountedCohort};
pub use distinct::{get_distinct_user_and_order_count, percent_of, BandSummary, CohortSummary};
pub use first_order::{apply_writes, earliest_order, plan_first_order_updates, FirstOrderPlan};
pub use rows::{format_cohort_date, format_for_csv, ReportRow};

/// Run every aggregation stage over already-marked customers.
///
/// Emits one row per cohort, in first-occurrence order, with all seven band
/// columns.
pub fn build_report_rows(customers: Vec<Customer>) -> Result<Vec<ReportRow>, BucketError> {
    let cohorts = count_customers_by_cohort(split_cohorts(customers)?);
    let bucketed = group_orders_by_time_from_join(cohorts)?;
    let summaries = get_distinct_user_and_order_count(bucketed);
    let keys: Vec<CohortKey> = summaries.iter().map(|s| s.key).collect();
    Ok(format_for_csv(&summaries, &keys, &TimeBand::ALL))
}
