//! Revenue/order rollups over sales facts.

use chrono::Timelike;
use std::collections::{BTreeMap, HashSet};

use super::bucket::{bucket_key, Granularity};
use super::facts::{CustomerTally, SalesFact};
use crate::models::{HourlyPoint, Order, SeriesPoint};

/// Running totals for one group.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    pub revenue: f64,
    pub orders: u64,
    buyers: HashSet<String>,
    counted: u64,
}

impl Accumulator {
    pub fn add(&mut self, fact: &SalesFact) {
        self.revenue += fact.revenue;
        self.orders += fact.orders;
        match &fact.customers {
            CustomerTally::Buyer(Some(id)) => {
                self.buyers.insert(id.clone());
            }
            CustomerTally::Buyer(None) => {}
            CustomerTally::Counted(n) => self.counted += n,
        }
    }

    /// Distinct buyers plus any pre-counted summary customers.
    pub fn customers(&self) -> u64 {
        self.buyers.len() as u64 + self.counted
    }

    pub fn avg_order_value(&self) -> f64 {
        ratio(self.revenue, self.orders as f64)
    }

    pub fn ordering_rate(&self) -> f64 {
        ratio(self.orders as f64, self.customers() as f64) * 100.0
    }
}

/// `num / den`, or 0 when `den` is 0.
pub fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Round to one decimal place.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Group facts into time buckets, ordered by bucket key.
pub fn revenue_series(facts: &[SalesFact], granularity: Granularity) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<String, Accumulator> = BTreeMap::new();
    for fact in facts {
        buckets
            .entry(bucket_key(fact.at, granularity))
            .or_default()
            .add(fact);
    }

    buckets
        .into_iter()
        .map(|(date, acc)| SeriesPoint {
            date,
            revenue: acc.revenue,
            orders: acc.orders,
            customers: acc.customers(),
            avg_order_value: acc.avg_order_value(),
            ordering_rate: acc.ordering_rate(),
        })
        .collect()
}

/// Revenue and order counts per hour of day (UTC), always 24 points.
pub fn hourly_distribution(orders: &[Order]) -> Vec<HourlyPoint> {
    let mut points: Vec<HourlyPoint> = (0..24)
        .map(|hour| HourlyPoint {
            hour,
            revenue: 0.0,
            orders: 0,
        })
        .collect();

    for order in orders {
        let slot = &mut points[order.created_at.hour() as usize];
        slot.revenue += order.total_price;
        slot.orders += 1;
    }

    points
}
