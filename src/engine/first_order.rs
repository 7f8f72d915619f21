//! Planning which orders carry the first-order flag.

use crate::domain::{Customer, CustomerId, Order, OrderId};

/// Flag writes needed to bring one customer's orders into a consistent state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstOrderPlan {
    pub customer_id: CustomerId,
    /// Earliest order, when it is not flagged yet.
    pub mark: Option<OrderId>,
    /// Orders flagged as first that are not the earliest.
    pub clear: Vec<OrderId>,
}

impl FirstOrderPlan {
    pub fn is_empty(&self) -> bool {
        self.mark.is_none() && self.clear.is_empty()
    }

    /// Writes in the order they should be applied: clears first, then the mark.
    pub fn writes(&self) -> Vec<(OrderId, bool)> {
        self.clear
            .iter()
            .map(|id| (*id, false))
            .chain(self.mark.map(|id| (id, true)))
            .collect()
    }
}

/// Earliest order by creation time; ties go to the lowest order id.
pub fn earliest_order(orders: &[Order]) -> Option<&Order> {
    orders
        .iter()
        .min_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)))
}

/// Plan flag updates for every customer that has orders.
///
/// Customers without orders, or whose flags are already correct, produce
/// no plan, so planning against already-marked data yields nothing.
pub fn plan_first_order_updates(customers: &[Customer]) -> Vec<FirstOrderPlan> {
    customers
        .iter()
        .filter_map(|customer| {
            let earliest = earliest_order(&customer.orders)?;
            let plan = FirstOrderPlan {
                customer_id: customer.id,
                mark: (!earliest.first_order).then_some(earliest.id),
                clear: customer
                    .orders
                    .iter()
                    .filter(|o| o.first_order && o.id != earliest.id)
                    .map(|o| o.id)
                    .collect(),
            };
            (!plan.is_empty()).then_some(plan)
        })
        .collect()
}

/// Apply persisted flag writes to the in-memory orders.
pub fn apply_writes(orders: &mut [Order], writes: &[(OrderId, bool)]) {
    for (order_id, value) in writes {
        if let Some(order) = orders.iter_mut().find(|o| o.id == *order_id) {
            order.first_order = *value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn order(id: i64, customer: i64, day: u32, first: bool) -> Order {
        let mut o = Order::new(
            OrderId::new(id),
            CustomerId::new(customer),
            Utc.with_ymd_and_hms(2020, 3, day, 9, 0, 0).unwrap(),
        );
        o.first_order = first;
        o
    }

    fn customer(id: i64, orders: Vec<Order>) -> Customer {
        Customer::new(
            CustomerId::new(id),
            Utc.with_ymd_and_hms(2020, 3, 1, 0, 0, 0).unwrap(),
        )
        .with_orders(orders)
    }

    #[test]
    fn test_marks_earliest_order() {
        let customers = vec![customer(1, vec![order(11, 1, 9, false), order(10, 1, 4, false)])];
        let plans = plan_first_order_updates(&customers);
        assert_eq!(
            plans,
            vec![FirstOrderPlan {
                customer_id: CustomerId::new(1),
                mark: Some(OrderId::new(10)),
                clear: vec![],
            }]
        );
    }

    #[test]
    fn test_customer_without_orders_is_skipped() {
        let customers = vec![customer(1, vec![])];
        assert!(plan_first_order_updates(&customers).is_empty());
    }

    #[test]
    fn test_already_marked_is_noop() {
        let customers = vec![customer(1, vec![order(10, 1, 4, true), order(11, 1, 9, false)])];
        assert!(plan_first_order_updates(&customers).is_empty());
    }

    #[test]
    fn test_tie_breaks_on_lowest_id() {
        let customers = vec![customer(1, vec![order(21, 1, 4, false), order(20, 1, 4, false)])];
        let plans = plan_first_order_updates(&customers);
        assert_eq!(plans[0].mark, Some(OrderId::new(20)));
    }

    #[test]
    fn test_stale_flag_is_cleared() {
        let customers = vec![customer(1, vec![order(10, 1, 4, false), order(11, 1, 9, true)])];
        let plans = plan_first_order_updates(&customers);
        assert_eq!(plans[0].mark, Some(OrderId::new(10)));
        assert_eq!(plans[0].clear, vec![OrderId::new(11)]);
        assert_eq!(
            plans[0].writes(),
            vec![(OrderId::new(11), false), (OrderId::new(10), true)]
        );
    }

    #[test]
    fn test_apply_then_replan_is_idempotent() {
        let mut customers = vec![
            customer(1, vec![order(10, 1, 4, false), order(11, 1, 9, true)]),
            customer(2, vec![order(12, 2, 6, false)]),
        ];
        for plan in plan_first_order_updates(&customers) {
            let c = customers
                .iter_mut()
                .find(|c| c.id == plan.customer_id)
                .unwrap();
            apply_writes(&mut c.orders, &plan.writes());
        }
        for c in &customers {
            assert_eq!(c.flagged_first_orders(), 1);
            assert!(earliest_order(&c.orders).unwrap().first_order);
        }
        assert!(plan_first_order_updates(&customers).is_empty());
    }
}
