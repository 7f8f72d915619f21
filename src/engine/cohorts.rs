//! Splitting customers into join-week cohorts and counting them.

use super::bucketing::BucketError;
use crate::domain::{CohortKey, Customer};
use std::collections::HashMap;

/// Customers sharing a join week.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cohort {
    pub key: CohortKey,
    pub customers: Vec<Customer>,
}

/// A cohort annotated with its size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedCohort {
    pub key: CohortKey,
    pub customer_count: usize,
    pub customers: Vec<Customer>,
}

/// Group customers by the ISO week of their join timestamp.
///
/// Cohorts appear in the order their first member appears in the input, and
/// members keep their input order.
pub fn split_cohorts(customers: Vec<Customer>) -> Result<Vec<Cohort>, BucketError> {
    let mut index: HashMap<CohortKey, usize> = HashMap::new();
    let mut cohorts: Vec<Cohort> = Vec::new();

    for customer in customers {
        let key = CohortKey::from_datetime(&customer.created).map_err(|_| {
            BucketError::JoinWeekOutOfRange {
                customer_id: customer.id,
                created: customer.created,
            }
        })?;
        let slot = *index.entry(key).or_insert_with(|| {
            cohorts.push(Cohort {
                key,
                customers: Vec::new(),
            });
            cohorts.len() - 1
        });
        cohorts[slot].customers.push(customer);
    }

    Ok(cohorts)
}

pub fn count_customers_by_cohort(cohorts: Vec<Cohort>) -> Vec<CountedCohort> {
    cohorts
        .into_iter()
        .map(|cohort| CountedCohort {
            key: cohort.key,
            customer_count: cohort.customers.len(),
            customers: cohort.customers,
        })
        .collect()
}
