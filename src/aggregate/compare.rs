//! Period-over-period comparison.

use crate::models::{Comparison, KpiComparison, KpiSummary, Trend};

/// Whether a rising value is good news.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    HigherIsBetter,
    /// Churn-style metrics: a drop reads as `Up`.
    LowerIsBetter,
}

/// Percent change from `previous` to `current`. A zero baseline yields 100
/// for a positive current value and 0 otherwise.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Equal values always trend `Up`.
pub fn compare(current: f64, previous: f64, polarity: Polarity) -> Comparison {
    let improving = match polarity {
        Polarity::HigherIsBetter => current >= previous,
        Polarity::LowerIsBetter => current <= previous,
    };
    Comparison {
        current,
        previous,
        change: percent_change(current, previous),
        trend: if improving { Trend::Up } else { Trend::Down },
    }
}

pub fn compare_kpis(current: &KpiSummary, previous: &KpiSummary) -> KpiComparison {
    let up = Polarity::HigherIsBetter;
    KpiComparison {
        total_revenue: compare(current.total_revenue, previous.total_revenue, up),
        total_orders: compare(current.total_orders as f64, previous.total_orders as f64, up),
        avg_order_value: compare(current.avg_order_value, previous.avg_order_value, up),
        percent_ordering: compare(current.percent_ordering, previous.percent_ordering, up),
        new_customers: compare(current.new_customers as f64, previous.new_customers as f64, up),
        churn_risk: compare(current.churn_risk, previous.churn_risk, Polarity::LowerIsBetter),
        net_revenue: compare(current.net_revenue, previous.net_revenue, up),
    }
}
