//! Signup-month cohort tables.
//!
//! A customer's cohort is the `YYYY-MM` of their signup. An order's month
//! index is the number of calendar months between signup and the order;
//! orders that would land before signup are skipped.

use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::bucket::month_key;
use super::rollup::{ratio, round1};
use crate::models::{CohortPoint, Customer, Order};

/// Calendar-month distance from `signup` to `order`.
pub fn month_offset(signup: DateTime<Utc>, order: DateTime<Utc>) -> i32 {
    (order.year() - signup.year()) * 12 + (order.month() as i32 - signup.month() as i32)
}

struct Cohort<'a> {
    size: u64,
    income: BTreeMap<u32, f64>,
    active: BTreeMap<u32, HashSet<&'a str>>,
}

fn build_cohorts<'a>(
    customers: &'a [Customer],
    orders: &'a [Order],
) -> BTreeMap<String, Cohort<'a>> {
    let mut cohorts: BTreeMap<String, Cohort<'a>> = BTreeMap::new();
    let mut signup: HashMap<&str, (String, DateTime<Utc>)> = HashMap::new();

    for customer in customers {
        if signup.contains_key(customer.id.as_str()) {
            continue;
        }
        let key = month_key(customer.created_at);
        cohorts
            .entry(key.clone())
            .or_insert_with(|| Cohort {
                size: 0,
                income: BTreeMap::new(),
                active: BTreeMap::new(),
            })
            .size += 1;
        signup.insert(customer.id.as_str(), (key, customer.created_at));
    }

    for order in orders {
        let Some(cid) = order.customer_id.as_deref() else {
            continue;
        };
        let Some((key, signed_up)) = signup.get(cid) else {
            continue;
        };
        let offset = month_offset(*signed_up, order.created_at);
        if offset < 0 {
            tracing::debug!(
                order = %order.id,
                customer = cid,
                "order before signup month; skipped"
            );
            continue;
        }
        if let Some(cohort) = cohorts.get_mut(key) {
            let m = offset as u32;
            *cohort.income.entry(m).or_insert(0.0) += order.total_price;
            cohort.active.entry(m).or_default().insert(cid);
        }
    }

    cohorts
}

fn max_index(cohort: &Cohort<'_>) -> u32 {
    let income_max = cohort.income.keys().next_back().copied().unwrap_or(0);
    let active_max = cohort.active.keys().next_back().copied().unwrap_or(0);
    income_max.max(active_max)
}

/// Average cumulative income per cohort customer at each month index from
/// 0 through the last index with an order.
pub fn cohort_income(customers: &[Customer], orders: &[Order]) -> Vec<CohortPoint> {
    let mut out = Vec::new();
    for (month, cohort) in build_cohorts(customers, orders) {
        let mut cumulative = 0.0;
        for m in 0..=max_index(&cohort) {
            cumulative += cohort.income.get(&m).copied().unwrap_or(0.0);
            out.push(CohortPoint {
                cohort_month: month.clone(),
                month_index: m,
                cohort_size: cohort.size,
                value: ratio(cumulative, cohort.size as f64),
            });
        }
    }
    out
}

/// Share of each cohort (percent, one decimal) with at least one order at
/// exactly each month index.
pub fn cohort_retention(customers: &[Customer], orders: &[Order]) -> Vec<CohortPoint> {
    let mut out = Vec::new();
    for (month, cohort) in build_cohorts(customers, orders) {
        for m in 0..=max_index(&cohort) {
            let active = cohort.active.get(&m).map(HashSet::len).unwrap_or(0);
            out.push(CohortPoint {
                cohort_month: month.clone(),
                month_index: m,
                cohort_size: cohort.size,
                value: round1(ratio(active as f64, cohort.size as f64) * 100.0),
            });
        }
    }
    out
}
