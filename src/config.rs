use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const ORDERS_TABLE: &str = "orders";
pub const CUSTOMERS_TABLE: &str = "customers";
pub const LINE_ITEMS_TABLE: &str = "order_line_items";
pub const REFUNDS_TABLE: &str = "refunds";
pub const SUMMARY_TABLE: &str = "daily_sales_summary";
pub const SETTINGS_TABLE: &str = "store_settings";

pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_ROW_CAP: usize = 100_000;
pub const DEFAULT_TOP_CUSTOMERS: usize = 10;
pub const TOP_PRODUCTS: usize = 10;

pub const SETTINGS_TTL: Duration = Duration::from_secs(5 * 60);

pub const REST_TIMEOUT: Duration = Duration::from_secs(10);
pub const REST_RETRIES: u32 = 2;

/// Label used for orders without a channel.
pub const DEFAULT_CHANNEL: &str = "Direct";
/// Label used for orders without a customer segment.
pub const DEFAULT_SEGMENT: &str = "Unknown";

/// Breakdown colors, assigned by rank and cycled.
pub const PALETTE: [&str; 8] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

/// DDL for the canonical transactional tables.
pub const RAW_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS orders (
    id VARCHAR, tenant_id VARCHAR, created_at TIMESTAMP, total_price DOUBLE,
    customer_id VARCHAR, channel VARCHAR, status VARCHAR, customer_segment VARCHAR
);
CREATE TABLE IF NOT EXISTS customers (
    id VARCHAR, tenant_id VARCHAR, created_at TIMESTAMP, first_order_date TIMESTAMP,
    last_order_date TIMESTAMP, total_orders BIGINT, total_spent DOUBLE, segment VARCHAR
);
CREATE TABLE IF NOT EXISTS order_line_items (
    order_id VARCHAR, tenant_id VARCHAR, product_id VARCHAR, product_title VARCHAR,
    quantity BIGINT, unit_price DOUBLE, created_at TIMESTAMP
);
CREATE TABLE IF NOT EXISTS refunds (
    order_id VARCHAR, tenant_id VARCHAR, amount DOUBLE, created_at TIMESTAMP
);
CREATE TABLE IF NOT EXISTS store_settings (
    tenant_id VARCHAR, financial_year_start VARCHAR, financial_year_end VARCHAR,
    churn_period_days BIGINT, currency VARCHAR, timezone VARCHAR
);
";

/// DDL for the precomputed per-day summary. Installed separately since
/// stores without it must fall back to the raw orders table.
pub const SUMMARY_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS daily_sales_summary (
    tenant_id VARCHAR, date DATE, channel VARCHAR, customer_segment VARCHAR,
    revenue DOUBLE, order_count BIGINT, customer_count BIGINT
);
";

/// Per-tenant settings that drive fiscal-year ranges and churn thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_fy_start")]
    pub financial_year_start: String,
    #[serde(default = "default_fy_end")]
    pub financial_year_end: String,
    #[serde(default = "default_churn_period")]
    pub churn_period_days: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            financial_year_start: default_fy_start(),
            financial_year_end: default_fy_end(),
            churn_period_days: default_churn_period(),
            currency: default_currency(),
            timezone: default_timezone(),
        }
    }
}

fn default_fy_start() -> String {
    "01-01".to_string()
}

fn default_fy_end() -> String {
    "12-31".to_string()
}

fn default_churn_period() -> i64 {
    180
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

pub fn default_database_path() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("merchant-analytics").join("analytics.duckdb")
    } else {
        PathBuf::from(".merchant-analytics/analytics.duckdb")
    }
}
