//! Unit tests for the SqlBuilder query construction and its translation of
//! store-neutral page requests.

use chrono::{NaiveDate, TimeZone, Utc};
use merchant_analytics::store::{Bound, PageRequest, TenantScope};
use merchant_analytics::SqlBuilder;

// ---------------------------------------------------------------------------
// Basic construction
// ---------------------------------------------------------------------------

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("orders").build();
    assert_eq!(sql, "SELECT *\nFROM orders");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("orders")
        .select(&["id", "total_price"])
        .build();
    assert!(sql.starts_with("SELECT id, total_price\n"));
}

// ---------------------------------------------------------------------------
// WHERE conditions
// ---------------------------------------------------------------------------

#[test]
fn where_eq_adds_equality_with_param() {
    let (sql, params) = SqlBuilder::new("orders")
        .where_eq("tenant_id", "shop-1")
        .build();
    assert!(sql.contains("WHERE tenant_id = ?"));
    assert_eq!(params, vec!["shop-1"]);
}

#[test]
fn where_cast_casts_the_parameter() {
    let (sql, params) = SqlBuilder::new("orders")
        .where_cast("created_at", ">=", "2024-01-01 00:00:00.000", "TIMESTAMP")
        .build();
    assert!(sql.contains("created_at >= CAST(? AS TIMESTAMP)"));
    assert_eq!(params, vec!["2024-01-01 00:00:00.000"]);
}

#[test]
fn where_clause_appends_params_in_order() {
    let (sql, params) = SqlBuilder::new("orders")
        .where_eq("tenant_id", "shop-1")
        .where_clause("total_price > ?", &["10"])
        .build();
    assert!(sql.contains("WHERE tenant_id = ? AND total_price > ?"));
    assert_eq!(params, vec!["shop-1", "10"]);
}

// ---------------------------------------------------------------------------
// ORDER BY / LIMIT / OFFSET
// ---------------------------------------------------------------------------

#[test]
fn order_by_adds_clause() {
    let (sql, _) = SqlBuilder::new("orders")
        .order_by(&["created_at ASC", "id DESC"])
        .build();
    assert!(sql.contains("ORDER BY created_at ASC, id DESC"));
}

#[test]
fn limit_and_offset_together() {
    let (sql, _) = SqlBuilder::new("orders").limit(10).offset(20).build();
    assert!(sql.ends_with("LIMIT 10\nOFFSET 20"));
}

// ---------------------------------------------------------------------------
// Page requests
// ---------------------------------------------------------------------------

#[test]
fn from_request_renders_typed_bounds() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let request = PageRequest::new("orders")
        .columns(&["id", "created_at"])
        .scoped(&TenantScope::Tenant("shop-1".into()))
        .gte("created_at", Bound::Timestamp(start))
        .lte("date", Bound::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()))
        .order_asc("created_at")
        .order_desc("id")
        .limit(1000)
        .offset(2000);

    let (sql, params) = SqlBuilder::from_request(&request).build();

    assert_eq!(
        sql,
        "SELECT id, created_at\n\
         FROM orders\n\
         WHERE tenant_id = ? AND created_at >= CAST(? AS TIMESTAMP) AND date <= CAST(? AS DATE)\n\
         ORDER BY created_at ASC, id DESC\n\
         LIMIT 1000\n\
         OFFSET 2000"
    );
    assert_eq!(params, vec!["shop-1", "2024-01-01 00:00:00.000", "2024-01-31"]);
}

#[test]
fn all_tenants_scope_adds_no_tenant_condition() {
    let request = PageRequest::new("orders").scoped(&TenantScope::AllTenants);
    let (sql, params) = SqlBuilder::from_request(&request).build();
    assert!(!sql.contains("WHERE"));
    assert!(params.is_empty());
}

#[test]
fn unset_optional_filters_are_skipped() {
    let request = PageRequest::new("orders")
        .eq_opt("channel", None)
        .eq_opt("customer_segment", Some("loyal"));
    let (sql, params) = SqlBuilder::from_request(&request).build();
    assert!(!sql.contains("channel"));
    assert!(sql.contains("customer_segment = ?"));
    assert_eq!(params, vec!["loyal"]);
}
