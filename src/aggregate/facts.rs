//! Canonical sales facts and the per-tier row union they are built from.

use chrono::{DateTime, Utc};

use crate::models::{Order, SummaryRow};
use crate::range::start_of_day;

/// How a fact contributes to a distinct-customer count.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomerTally {
    /// A raw order: the buyer, if known, joins a distinct set.
    Buyer(Option<String>),
    /// A summary row: already-counted customers for that row's day.
    Counted(u64),
}

/// Store-neutral unit of sales data that every rollup consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesFact {
    pub at: DateTime<Utc>,
    /// False when `at` is only day-precise (summary tier).
    pub has_time: bool,
    pub channel: Option<String>,
    pub segment: Option<String>,
    pub revenue: f64,
    pub orders: u64,
    pub customers: CustomerTally,
}

/// Rows from whichever tier answered a sales request.
#[derive(Debug, Clone, PartialEq)]
pub enum SalesRows {
    Summary(Vec<SummaryRow>),
    Raw(Vec<Order>),
}

impl SalesRows {
    pub fn is_summary(&self) -> bool {
        matches!(self, SalesRows::Summary(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SalesRows::Summary(rows) => rows.is_empty(),
            SalesRows::Raw(rows) => rows.is_empty(),
        }
    }

    pub fn facts(&self) -> Vec<SalesFact> {
        match self {
            SalesRows::Summary(rows) => rows.iter().map(SalesFact::from).collect(),
            SalesRows::Raw(rows) => rows.iter().map(SalesFact::from).collect(),
        }
    }
}

impl Default for SalesRows {
    fn default() -> Self {
        SalesRows::Raw(Vec::new())
    }
}

impl From<&Order> for SalesFact {
    fn from(order: &Order) -> Self {
        Self {
            at: order.created_at,
            has_time: true,
            channel: order.channel.clone(),
            segment: order.customer_segment.clone(),
            revenue: order.total_price,
            orders: 1,
            customers: CustomerTally::Buyer(order.customer_id.clone()),
        }
    }
}

impl From<&SummaryRow> for SalesFact {
    fn from(row: &SummaryRow) -> Self {
        Self {
            at: start_of_day(row.date),
            has_time: false,
            channel: row.channel.clone(),
            segment: row.customer_segment.clone(),
            revenue: row.revenue,
            orders: row.order_count.max(0) as u64,
            customers: CustomerTally::Counted(row.customer_count.max(0) as u64),
        }
    }
}
