use serde::{Deserialize, Serialize};

use super::customer::Segment;

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// One time bucket of a revenue series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub date: String,
    pub revenue: f64,
    pub orders: u64,
    pub customers: u64,
    pub avg_order_value: f64,
    pub ordering_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyPoint {
    pub hour: u32,
    pub revenue: f64,
    pub orders: u64,
}

// ---------------------------------------------------------------------------
// Breakdowns and rankings
// ---------------------------------------------------------------------------

/// One channel or segment slice of a breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub name: String,
    pub revenue: f64,
    pub orders: u64,
    pub customers: u64,
    /// Share of the breakdown's total revenue, rounded to one decimal.
    pub percentage: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: String,
    pub title: Option<String>,
    pub revenue: f64,
    pub quantity: i64,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub customer_id: String,
    pub revenue: f64,
    pub orders: u64,
    pub avg_order_value: f64,
}

// ---------------------------------------------------------------------------
// Cohorts
// ---------------------------------------------------------------------------

/// One cell of a cohort table. `value` is either average cumulative income
/// per customer or a retention percentage, depending on the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortPoint {
    pub cohort_month: String,
    pub month_index: u32,
    pub cohort_size: u64,
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Churn
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRisk {
    pub customer_id: String,
    pub days_since_last_order: i64,
    pub avg_order_frequency: f64,
    pub is_churned: bool,
    pub risk_level: RiskLevel,
    pub segment: Segment,
}

// ---------------------------------------------------------------------------
// KPIs and comparisons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSummary {
    pub total_revenue: f64,
    pub total_orders: u64,
    pub avg_order_value: f64,
    pub percent_ordering: f64,
    pub new_customers: u64,
    pub churn_risk: f64,
    pub refunded_amount: f64,
    pub net_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub current: f64,
    pub previous: f64,
    /// Percentage change from `previous` to `current`.
    pub change: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiComparison {
    pub total_revenue: Comparison,
    pub total_orders: Comparison,
    pub avg_order_value: Comparison,
    pub percent_ordering: Comparison,
    pub new_customers: Comparison,
    pub churn_risk: Comparison,
    pub net_revenue: Comparison,
}
