//! Report facade: fetch rows for a filter, aggregate them, return plain
//! series and tables.
//!
//! Fetch failures stop here. Every report logs the error and returns its
//! empty or zeroed shape, so callers never handle store errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::{self, churn, Granularity, KpiInputs, SalesRows};
use crate::config::{Settings, DEFAULT_TOP_CUSTOMERS, TOP_PRODUCTS};
use crate::error::Result;
use crate::models::{
    BreakdownRow, CohortPoint, Customer, CustomerRisk, FilterState, HourlyPoint, KpiComparison,
    KpiSummary, Order, SeriesPoint, TopCustomer, TopProduct,
};
use crate::queries::{CustomerQuery, LineItemQuery, OrderQuery, RefundQuery, SalesQuery, Source};

/// Baseline window for KPI comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    PreviousPeriod,
    PreviousYear,
}

/// Everything the dashboard landing page shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub kpis: KpiComparison,
    pub revenue: Vec<SeriesPoint>,
    pub channels: Vec<BreakdownRow>,
    pub segments: Vec<BreakdownRow>,
}

pub struct ReportQuery<'a> {
    source: Source<'a>,
    settings: Settings,
    now: DateTime<Utc>,
}

impl<'a> ReportQuery<'a> {
    /// `now` anchors churn scoring; `settings` supplies the churn threshold.
    pub fn new(source: Source<'a>, settings: Settings, now: DateTime<Utc>) -> Self {
        Self { source, settings, now }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn or_empty<T: Default>(&self, report: &str, result: Result<T>) -> T {
        result.unwrap_or_else(|e| {
            tracing::warn!(report, error = %e, "fetch failed; returning empty result");
            T::default()
        })
    }

    /// Sales rows from the summary tier when available, raw orders otherwise.
    pub fn sales(&self, filter: &FilterState) -> SalesRows {
        self.or_empty("sales", SalesQuery::new(self.source).fetch(filter))
    }

    pub fn revenue_series(
        &self,
        filter: &FilterState,
        granularity: Granularity,
    ) -> Vec<SeriesPoint> {
        aggregate::revenue_series(&self.sales(filter).facts(), granularity)
    }

    /// Always read from raw orders: the summary has no time of day.
    pub fn hourly(&self, filter: &FilterState) -> Vec<HourlyPoint> {
        let orders = self.or_empty("hourly", OrderQuery::new(self.source).in_range(filter));
        aggregate::hourly_distribution(&orders.rows)
    }

    pub fn channel_breakdown(&self, filter: &FilterState) -> Vec<BreakdownRow> {
        aggregate::channel_breakdown(&self.sales(filter).facts())
    }

    pub fn segment_breakdown(&self, filter: &FilterState) -> Vec<BreakdownRow> {
        aggregate::segment_breakdown(&self.sales(filter).facts())
    }

    pub fn top_products(&self, filter: &FilterState) -> Vec<TopProduct> {
        let items = self.or_empty("top_products", LineItemQuery::new(self.source).in_range(filter));
        aggregate::top_products(&items.rows, TOP_PRODUCTS)
    }

    /// Top customers by revenue; `limit` defaults to 10.
    pub fn top_customers(&self, filter: &FilterState, limit: Option<usize>) -> Vec<TopCustomer> {
        let orders = self.or_empty("top_customers", OrderQuery::new(self.source).in_range(filter));
        aggregate::top_customers(&orders.rows, limit.unwrap_or(DEFAULT_TOP_CUSTOMERS))
    }

    /// Cohorts of customers who signed up in the window, with their orders
    /// from the same window.
    pub fn cohort_income(&self, filter: &FilterState) -> Vec<CohortPoint> {
        let (customers, orders) = self.cohort_rows(filter);
        aggregate::cohort_income(&customers, &orders)
    }

    pub fn cohort_retention(&self, filter: &FilterState) -> Vec<CohortPoint> {
        let (customers, orders) = self.cohort_rows(filter);
        aggregate::cohort_retention(&customers, &orders)
    }

    fn cohort_rows(&self, filter: &FilterState) -> (Vec<Customer>, Vec<Order>) {
        let customers = self.or_empty("cohorts", CustomerQuery::new(self.source).signed_up(filter));
        if customers.is_empty() {
            return (Vec::new(), Vec::new());
        }
        // Segment narrows the cohort, not the orders.
        let mut order_filter = filter.clone();
        order_filter.segment = None;
        let orders = self.or_empty("cohorts", OrderQuery::new(self.source).in_range(&order_filter));
        (customers.rows, orders.rows)
    }

    /// Risk scores, as of now, for every customer known by the end of the
    /// window. The window picks who is scored, never the scoring date.
    pub fn churn(&self, filter: &FilterState) -> Vec<CustomerRisk> {
        let customers = self.or_empty("churn", CustomerQuery::new(self.source).known_by(filter));
        churn::score_customers(&customers.rows, self.settings.churn_period_days, self.now)
    }

    pub fn kpis(&self, filter: &FilterState) -> KpiSummary {
        let sales = self.sales(filter);
        let customers = CustomerQuery::new(self.source);
        let known = self.or_empty("kpis", customers.known_by(filter));
        let signed_up = known
            .rows
            .iter()
            .filter(|c| c.created_at >= filter.start_date && c.created_at <= filter.end_date)
            .count() as u64;
        let risks = churn::score_customers(&known.rows, self.settings.churn_period_days, self.now);
        let refunds = self.or_empty("kpis", RefundQuery::new(self.source).in_range(filter));

        aggregate::kpi_summary(&KpiInputs {
            facts: &sales.facts(),
            new_customers: signed_up,
            known_customers: known.len() as u64,
            risks: &risks,
            refunds: &refunds.rows,
        })
    }

    /// KPIs for the window against the chosen baseline window.
    pub fn kpi_comparison(&self, filter: &FilterState, mode: ComparisonMode) -> KpiComparison {
        let range = filter.range();
        let baseline = match mode {
            ComparisonMode::PreviousPeriod => range.previous_period(),
            ComparisonMode::PreviousYear => range.previous_year(),
        };
        let current = self.kpis(filter);
        let previous = self.kpis(&filter.with_range(&baseline));
        aggregate::compare_kpis(&current, &previous)
    }

    pub fn overview(&self, filter: &FilterState, granularity: Granularity) -> Overview {
        let facts = self.sales(filter).facts();
        Overview {
            kpis: self.kpi_comparison(filter, ComparisonMode::PreviousPeriod),
            revenue: aggregate::revenue_series(&facts, granularity),
            channels: aggregate::channel_breakdown(&facts),
            segments: aggregate::segment_breakdown(&facts),
        }
    }
}
