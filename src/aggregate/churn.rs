//! Customer-level churn scoring and behavioral segment reclassification.

use chrono::{DateTime, Utc};

use super::rollup::{ratio, round1};
use crate::config::DEFAULT_SEGMENT;
use crate::models::{Customer, CustomerRisk, RiskLevel, Segment};

const DAY_MS: i64 = 86_400_000;

/// Order frequency assumed for customers with fewer than two orders.
pub const DEFAULT_ORDER_FREQUENCY_DAYS: f64 = 365.0;

/// Whole days from `earlier` to `later`, floored.
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later - earlier).num_milliseconds().div_euclid(DAY_MS)
}

/// Mean days between orders: span from first to last order over
/// `total_orders - 1` gaps.
pub fn avg_order_frequency(
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
    total_orders: i64,
) -> f64 {
    match (first, last) {
        (Some(first), Some(last)) if total_orders >= 2 => {
            let span_days = (last - first).num_milliseconds() as f64 / DAY_MS as f64;
            span_days / (total_orders - 1) as f64
        }
        _ => DEFAULT_ORDER_FREQUENCY_DAYS,
    }
}

pub fn risk_level(
    days_since_last_order: i64,
    avg_frequency: f64,
    churn_period_days: i64,
) -> RiskLevel {
    let days = days_since_last_order as f64;
    let period = churn_period_days as f64;

    if days_since_last_order > churn_period_days {
        RiskLevel::High
    } else if days > 0.5 * period && avg_frequency < 30.0 {
        RiskLevel::High
    } else if days > 0.33 * period && avg_frequency < 45.0 {
        RiskLevel::Medium
    } else if days > 2.0 * avg_frequency {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Override a stored segment label with observed behavior.
///
/// Churned wins outright. A `new` customer more than 90 days past their
/// first order becomes loyal (5+ orders), returning (2+) or inactive. The
/// resulting loyal customers idle over 120 days, or returning customers idle
/// over 90, become at-risk.
pub fn reclassify_segment(
    stored: &Segment,
    days_since_first_order: i64,
    days_since_last_order: i64,
    total_orders: i64,
    is_churned: bool,
) -> Segment {
    if is_churned {
        return Segment::Churned;
    }

    let segment = match stored {
        Segment::New if days_since_first_order > 90 => {
            if total_orders >= 5 {
                Segment::Loyal
            } else if total_orders >= 2 {
                Segment::Returning
            } else {
                Segment::Inactive
            }
        }
        other => other.clone(),
    };

    match segment {
        Segment::Loyal if days_since_last_order > 120 => Segment::AtRisk,
        Segment::Returning if days_since_last_order > 90 => Segment::AtRisk,
        other => other,
    }
}

/// Score one customer. Customers who never ordered have nothing to score.
pub fn score_customer(
    customer: &Customer,
    churn_period_days: i64,
    now: DateTime<Utc>,
) -> Option<CustomerRisk> {
    let last = customer.last_order_date?;
    let days_since_last = days_between(last, now);
    let first = customer.first_order_date.unwrap_or(customer.created_at);
    let frequency = avg_order_frequency(Some(first), Some(last), customer.total_orders);
    let is_churned = days_since_last > churn_period_days;

    let stored = Segment::parse(customer.segment.as_deref().unwrap_or(DEFAULT_SEGMENT));

    Some(CustomerRisk {
        customer_id: customer.id.clone(),
        days_since_last_order: days_since_last,
        avg_order_frequency: frequency,
        is_churned,
        risk_level: risk_level(days_since_last, frequency, churn_period_days),
        segment: reclassify_segment(
            &stored,
            days_between(first, now),
            days_since_last,
            customer.total_orders,
            is_churned,
        ),
    })
}

/// Score every customer with an order history, longest-idle first.
pub fn score_customers(
    customers: &[Customer],
    churn_period_days: i64,
    now: DateTime<Utc>,
) -> Vec<CustomerRisk> {
    let mut scored: Vec<CustomerRisk> = customers
        .iter()
        .filter_map(|c| score_customer(c, churn_period_days, now))
        .collect();
    scored.sort_by(|a, b| {
        b.days_since_last_order
            .cmp(&a.days_since_last_order)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    scored
}

/// Percent of scored customers that have churned, one decimal.
pub fn churn_rate(risks: &[CustomerRisk]) -> f64 {
    let churned = risks.iter().filter(|r| r.is_churned).count();
    round1(ratio(churned as f64, risks.len() as f64) * 100.0)
}
