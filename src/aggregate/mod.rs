//! Pure aggregation functions.
//!
//! Each function makes one pass over already-fetched rows, groups them by a
//! key, and projects an ordered result. None of them fail: empty input gives
//! an empty (or zeroed) result and every ratio is guarded against zero
//! denominators.

pub mod breakdown;
pub mod bucket;
pub mod churn;
pub mod cohort;
pub mod compare;
pub mod facts;
pub mod kpi;
pub mod ranking;
pub mod rollup;

pub use breakdown::{channel_breakdown, segment_breakdown};
pub use bucket::{bucket_key, week_start, Granularity};
pub use churn::{score_customer, score_customers};
pub use cohort::{cohort_income, cohort_retention, month_offset};
pub use compare::{compare, compare_kpis, percent_change, Polarity};
pub use facts::{CustomerTally, SalesFact, SalesRows};
pub use kpi::{kpi_summary, KpiInputs};
pub use ranking::{top_customers, top_products};
pub use rollup::{hourly_distribution, revenue_series};
