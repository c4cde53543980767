//! Top-level KPI summary.

use super::churn::churn_rate;
use super::facts::SalesFact;
use super::rollup::{ratio, round1, Accumulator};
use crate::models::{CustomerRisk, KpiSummary, Refund};

/// Everything a KPI summary is computed from, already fetched for one window.
#[derive(Debug, Clone, Copy)]
pub struct KpiInputs<'a> {
    pub facts: &'a [SalesFact],
    /// Customers who signed up inside the window.
    pub new_customers: u64,
    /// Customers known to the store by the end of the window.
    pub known_customers: u64,
    pub risks: &'a [CustomerRisk],
    pub refunds: &'a [Refund],
}

pub fn kpi_summary(inputs: &KpiInputs<'_>) -> KpiSummary {
    let mut acc = Accumulator::default();
    for fact in inputs.facts {
        acc.add(fact);
    }

    let refunded: f64 = inputs.refunds.iter().map(|r| r.amount).sum();
    let ordering = ratio(acc.customers() as f64, inputs.known_customers as f64) * 100.0;

    KpiSummary {
        total_revenue: acc.revenue,
        total_orders: acc.orders,
        avg_order_value: acc.avg_order_value(),
        percent_ordering: round1(ordering.min(100.0)),
        new_customers: inputs.new_customers,
        churn_risk: churn_rate(inputs.risks),
        refunded_amount: refunded,
        net_revenue: acc.revenue - refunded,
    }
}
