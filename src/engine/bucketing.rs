//! Bucketing each cohort's orders by days elapsed since the cohort week began.

use super::cohorts::CountedCohort;
use crate::domain::{CohortKey, Customer, CustomerId, Order, OrderId, TimeBand};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BucketError {
    /// An order predates the week its customer joined in.
    #[error(
        "data integrity violation: order {order_id} of customer {customer_id} is dated {elapsed_days} day(s) from the start of cohort {cohort}"
    )]
    OrderBeforeCohort {
        cohort: CohortKey,
        order_id: OrderId,
        customer_id: CustomerId,
        elapsed_days: i64,
    },
    /// A join timestamp whose week falls outside the calendar chrono supports.
    #[error("customer {customer_id} joined at {created}, outside any representable cohort week")]
    JoinWeekOutOfRange {
        customer_id: CustomerId,
        created: DateTime<Utc>,
    },
}

/// A cohort with its orders grouped by TimeBand.
///
/// Bands without orders have no entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketedCohort {
    pub key: CohortKey,
    pub customer_count: usize,
    pub customers: Vec<Customer>,
    pub orders: BTreeMap<TimeBand, Vec<Order>>,
}

/// Whole days between the start of the cohort week and the order's date.
pub fn elapsed_days(cohort: &CohortKey, created: &DateTime<Utc>) -> i64 {
    (created.date_naive() - cohort.week_start()).num_days()
}

/// Group every member's orders into TimeBands relative to the cohort week.
///
/// Fails on the first order dated before its cohort week starts.
pub fn group_orders_by_time_from_join(
    cohorts: Vec<CountedCohort>,
) -> Result<Vec<BucketedCohort>, BucketError> {
    cohorts.into_iter().map(bucket_cohort).collect()
}

fn bucket_cohort(cohort: CountedCohort) -> Result<BucketedCohort, BucketError> {
    let mut orders: BTreeMap<TimeBand, Vec<Order>> = BTreeMap::new();

    for order in cohort.customers.iter().flat_map(|c| c.orders.iter()) {
        let days = elapsed_days(&cohort.key, &order.created);
        let band = TimeBand::from_elapsed_days(days).ok_or(BucketError::OrderBeforeCohort {
            cohort: cohort.key,
            order_id: order.id,
            customer_id: order.customer_id,
            elapsed_days: days,
        })?;
        orders.entry(band).or_default().push(order.clone());
    }

    Ok(BucketedCohort {
        key: cohort.key,
        customer_count: cohort.customer_count,
        customers: cohort.customers,
        orders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cohorts::{count_customers_by_cohort, split_cohorts};
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 15, 30, 0).unwrap()
    }

    fn customer(id: i64, joined: DateTime<Utc>, order_dates: &[(i64, DateTime<Utc>)]) -> Customer {
        let cid = CustomerId::new(id);
        Customer::new(cid, joined).with_orders(
            order_dates
                .iter()
                .map(|(oid, created)| Order::new(OrderId::new(*oid), cid, *created))
                .collect(),
        )
    }

    #[test]
    fn test_elapsed_days_counts_from_monday() {
        let key: CohortKey = "2020_02".parse().unwrap();
        assert_eq!(elapsed_days(&key, &at(2020, 1, 6)), 0);
        assert_eq!(elapsed_days(&key, &at(2020, 1, 12)), 6);
        assert_eq!(elapsed_days(&key, &at(2020, 1, 13)), 7);
        assert_eq!(elapsed_days(&key, &at(2020, 1, 5)), -1);
    }

    #[test]
    fn test_orders_grouped_into_bands() {
        let customers = vec![
            customer(
                1,
                at(2020, 1, 8),
                &[(10, at(2020, 1, 9)), (11, at(2020, 1, 20)), (12, at(2020, 4, 1))],
            ),
            customer(2, at(2020, 1, 7), &[(13, at(2020, 1, 12))]),
        ];
        let cohorts = count_customers_by_cohort(split_cohorts(customers).unwrap());
        let bucketed = group_orders_by_time_from_join(cohorts).unwrap();
        assert_eq!(bucketed.len(), 1);

        let cohort = &bucketed[0];
        assert_eq!(cohort.customer_count, 2);
        let ids = |band: TimeBand| -> Vec<i64> {
            cohort.orders[&band].iter().map(|o| o.id.as_i64()).collect()
        };
        assert_eq!(ids(TimeBand::Days0To6), vec![10, 13]);
        assert_eq!(ids(TimeBand::Days14To20), vec![11]);
        assert_eq!(ids(TimeBand::Days42Plus), vec![12]);
        assert!(!cohort.orders.contains_key(&TimeBand::Days7To13));
    }

    #[test]
    fn test_order_before_cohort_is_an_error() {
        let key: CohortKey = "2020_01".parse().unwrap();
        let member = customer(7, at(2019, 12, 31), &[(70, at(2019, 12, 1))]);
        let counted = CountedCohort {
            key,
            customer_count: 1,
            customers: vec![member],
        };

        let err = group_orders_by_time_from_join(vec![counted]).unwrap_err();
        assert_eq!(
            err,
            BucketError::OrderBeforeCohort {
                cohort: key,
                order_id: OrderId::new(70),
                customer_id: CustomerId::new(7),
                elapsed_days: -29,
            }
        );
        assert!(err.to_string().contains("-29 day(s) from the start of cohort 2020_01"));
    }

    #[test]
    fn test_cohort_without_orders_has_no_bands() {
        let counted = CountedCohort {
            key: "2020_05".parse().unwrap(),
            customer_count: 1,
            customers: vec![customer(1, at(2020, 1, 28), &[])],
        };
        let bucketed = group_orders_by_time_from_join(vec![counted]).unwrap();
        assert!(bucketed[0].orders.is_empty());
    }
}
