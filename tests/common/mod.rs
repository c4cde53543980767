//! Shared fixtures for the integration tests.
//!
//! `setup_store()` returns an in-memory DuckDB connection with the
//! transactional tables populated for two tenants via NDJSON temp files.
//! `setup_store_with_summary()` also installs and fills the daily summary.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use merchant_analytics::models::{Customer, Order};
use merchant_analytics::{Connection, FilterState, MerchantAnalytics};
use std::io::Write;
use tempfile::NamedTempFile;

pub const TENANT: &str = "shop-1";
pub const OTHER_TENANT: &str = "shop-2";

/// `YYYY-MM-DD HH:MM:SS` as a UTC timestamp.
pub fn ts(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap()
        .and_utc()
}

pub fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Whole-day filter from `first` through `last`.
pub fn filter(first: &str, last: &str) -> FilterState {
    FilterState::new(
        ts(&format!("{} 00:00:00", first)),
        ts(&format!("{} 23:59:59", last)) + chrono::Duration::milliseconds(999),
    )
    .unwrap()
}

pub fn setup_store() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.install_schema().unwrap();
    register_orders(&conn);
    register_customers(&conn);
    register_line_items(&conn);
    register_refunds(&conn);
    register_settings(&conn);
    conn
}

pub fn setup_store_with_summary() -> Connection {
    let conn = setup_store();
    conn.install_summary_schema().unwrap();
    register_summary(&conn);
    conn
}

pub fn analytics(conn: Connection) -> MerchantAnalytics {
    MerchantAnalytics::builder()
        .connection(conn)
        .tenant(TENANT)
        .build()
        .unwrap()
}

fn register_orders(conn: &Connection) {
    let orders = vec![
        serde_json::json!({
            "id": "o1", "tenant_id": TENANT, "created_at": "2024-01-01 10:00:00",
            "total_price": 100.0, "customer_id": "c1", "channel": "Online",
            "status": "paid", "customer_segment": "new"
        }),
        serde_json::json!({
            "id": "o2", "tenant_id": TENANT, "created_at": "2024-01-01 15:30:00",
            "total_price": 50.0, "customer_id": "c2", "channel": "Retail",
            "status": "paid", "customer_segment": "returning"
        }),
        serde_json::json!({
            "id": "o3", "tenant_id": TENANT, "created_at": "2024-01-02 09:00:00",
            "total_price": 200.0, "customer_id": "c1", "channel": "Online",
            "status": "paid", "customer_segment": "new"
        }),
        serde_json::json!({
            "id": "o4", "tenant_id": TENANT, "created_at": "2024-02-10 12:00:00",
            "total_price": 80.0, "customer_id": "c2", "channel": null,
            "status": "paid", "customer_segment": "returning"
        }),
        serde_json::json!({
            "id": "o5", "tenant_id": TENANT, "created_at": "2024-03-05 18:00:00",
            "total_price": 120.0, "customer_id": "c3", "channel": "Online",
            "status": "paid", "customer_segment": null
        }),
        serde_json::json!({
            "id": "o9", "tenant_id": OTHER_TENANT, "created_at": "2024-01-01 11:00:00",
            "total_price": 999.0, "customer_id": "c9", "channel": "Online",
            "status": "paid", "customer_segment": "new"
        }),
    ];

    write_ndjson_and_register(conn, "orders", &orders);
}

fn register_customers(conn: &Connection) {
    let customers = vec![
        serde_json::json!({
            "id": "c1", "tenant_id": TENANT, "created_at": "2024-01-01 09:00:00",
            "first_order_date": "2024-01-01 10:00:00", "last_order_date": "2024-01-02 09:00:00",
            "total_orders": 2, "total_spent": 300.0, "segment": "new"
        }),
        serde_json::json!({
            "id": "c2", "tenant_id": TENANT, "created_at": "2023-12-15 08:00:00",
            "first_order_date": "2024-01-01 15:30:00", "last_order_date": "2024-02-10 12:00:00",
            "total_orders": 2, "total_spent": 130.0, "segment": "returning"
        }),
        serde_json::json!({
            "id": "c3", "tenant_id": TENANT, "created_at": "2024-03-01 10:00:00",
            "first_order_date": "2024-03-05 18:00:00", "last_order_date": "2024-03-05 18:00:00",
            "total_orders": 1, "total_spent": 120.0, "segment": "new"
        }),
        serde_json::json!({
            "id": "c9", "tenant_id": OTHER_TENANT, "created_at": "2024-01-01 08:00:00",
            "first_order_date": "2024-01-01 11:00:00", "last_order_date": "2024-01-01 11:00:00",
            "total_orders": 1, "total_spent": 999.0, "segment": "new"
        }),
    ];

    write_ndjson_and_register(conn, "customers", &customers);
}

fn register_line_items(conn: &Connection) {
    let items = vec![
        serde_json::json!({
            "order_id": "o1", "tenant_id": TENANT, "product_id": "p1", "product_title": "Widget",
            "quantity": 2, "unit_price": 50.0, "created_at": "2024-01-01 10:00:00"
        }),
        serde_json::json!({
            "order_id": "o2", "tenant_id": TENANT, "product_id": "p2", "product_title": "Gadget",
            "quantity": 1, "unit_price": 50.0, "created_at": "2024-01-01 15:30:00"
        }),
        serde_json::json!({
            "order_id": "o3", "tenant_id": TENANT, "product_id": "p1", "product_title": "Widget",
            "quantity": 4, "unit_price": 50.0, "created_at": "2024-01-02 09:00:00"
        }),
        serde_json::json!({
            "order_id": "o4", "tenant_id": TENANT, "product_id": "p2", "product_title": "Gadget",
            "quantity": 1, "unit_price": 80.0, "created_at": "2024-02-10 12:00:00"
        }),
        serde_json::json!({
            "order_id": "o5", "tenant_id": TENANT, "product_id": "p3", "product_title": "Doohickey",
            "quantity": 3, "unit_price": 40.0, "created_at": "2024-03-05 18:00:00"
        }),
        serde_json::json!({
            "order_id": "o9", "tenant_id": OTHER_TENANT, "product_id": "p1",
            "product_title": "Widget", "quantity": 1, "unit_price": 999.0,
            "created_at": "2024-01-01 11:00:00"
        }),
    ];

    write_ndjson_and_register(conn, "order_line_items", &items);
}

fn register_refunds(conn: &Connection) {
    let refunds = vec![
        serde_json::json!({
            "order_id": "o3", "tenant_id": TENANT, "amount": 20.0,
            "created_at": "2024-01-05 10:00:00"
        }),
        serde_json::json!({
            "order_id": "o9", "tenant_id": OTHER_TENANT, "amount": 500.0,
            "created_at": "2024-01-05 10:00:00"
        }),
    ];

    write_ndjson_and_register(conn, "refunds", &refunds);
}

fn register_settings(conn: &Connection) {
    let settings = vec![serde_json::json!({
        "tenant_id": TENANT,
        "financial_year_start": "04-01",
        "financial_year_end": "03-31",
        "churn_period_days": 90,
        "currency": "EUR"
    })];

    write_ndjson_and_register(conn, "store_settings", &settings);
}

fn register_summary(conn: &Connection) {
    let rows = vec![
        serde_json::json!({
            "tenant_id": TENANT, "date": "2024-01-01", "channel": "Online",
            "customer_segment": "new", "revenue": 100.0, "order_count": 1, "customer_count": 1
        }),
        serde_json::json!({
            "tenant_id": TENANT, "date": "2024-01-01", "channel": "Retail",
            "customer_segment": "returning", "revenue": 50.0, "order_count": 1, "customer_count": 1
        }),
        serde_json::json!({
            "tenant_id": TENANT, "date": "2024-01-02", "channel": "Online",
            "customer_segment": "new", "revenue": 200.0, "order_count": 1, "customer_count": 1
        }),
        serde_json::json!({
            "tenant_id": OTHER_TENANT, "date": "2024-01-01", "channel": "Online",
            "customer_segment": "new", "revenue": 999.0, "order_count": 1, "customer_count": 1
        }),
    ];

    write_ndjson_and_register(conn, "daily_sales_summary", &rows);
}

/// Write rows as NDJSON to a temp file and append them to `table_name`.
pub fn write_ndjson_and_register(conn: &Connection, table_name: &str, rows: &[serde_json::Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let path = file.path().to_string_lossy().to_string();
    conn.load_ndjson(table_name, &path).unwrap();
}

// ---------------------------------------------------------------------------
// In-memory row builders for the pure aggregation tests
// ---------------------------------------------------------------------------

pub fn order(id: &str, at: &str, total: f64, customer: Option<&str>) -> Order {
    Order {
        id: id.to_string(),
        created_at: ts(at),
        total_price: total,
        customer_id: customer.map(str::to_string),
        channel: None,
        status: None,
        customer_segment: None,
    }
}

pub fn customer(id: &str, created: &str) -> Customer {
    Customer {
        id: id.to_string(),
        created_at: ts(created),
        first_order_date: None,
        last_order_date: None,
        total_orders: 0,
        total_spent: 0.0,
        segment: None,
    }
}
