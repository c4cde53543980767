//! Pagination, row decoding and the PostgREST request dialect.

use std::cell::RefCell;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use merchant_analytics::models::Order;
use merchant_analytics::rest::query_pairs;
use merchant_analytics::store::{
    decode_rows, fetch_all, Bound, FetchOptions, PageRequest, Row, RowStore, TenantScope,
};
use merchant_analytics::{AnalyticsError, RestStore, Result};
use serde_json::json;

/// In-memory store that honors limit/offset and records each page request.
struct VecStore {
    rows: Vec<Row>,
    pages: RefCell<Vec<(usize, usize)>>,
}

impl VecStore {
    fn with_rows(n: usize) -> Self {
        let rows = (0..n)
            .map(|i| {
                let mut row = Row::new();
                row.insert("id".into(), json!(format!("o{}", i)));
                row
            })
            .collect();
        Self {
            rows,
            pages: RefCell::new(Vec::new()),
        }
    }
}

impl RowStore for VecStore {
    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Row>> {
        let offset = request.offset.unwrap_or(0);
        let limit = request.limit.unwrap_or(usize::MAX);
        self.pages.borrow_mut().push((offset, limit));
        Ok(self.rows.iter().skip(offset).take(limit).cloned().collect())
    }

    fn describe(&self) -> String {
        "vec".into()
    }
}

struct FailingStore;

impl RowStore for FailingStore {
    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Row>> {
        Err(AnalyticsError::Fetch {
            table: request.table.clone(),
            reason: "boom".into(),
        })
    }

    fn describe(&self) -> String {
        "failing".into()
    }
}

fn options(page_size: usize, row_cap: usize) -> FetchOptions {
    FetchOptions { page_size, row_cap }
}

// ---------------------------------------------------------------------------
// fetch_all
// ---------------------------------------------------------------------------

#[test]
fn pages_until_a_short_page() {
    let store = VecStore::with_rows(2500);
    let set = fetch_all(&store, &PageRequest::new("orders"), options(1000, 100_000)).unwrap();

    assert_eq!(set.len(), 2500);
    assert!(!set.truncated);
    assert_eq!(
        *store.pages.borrow(),
        vec![(0, 1000), (1000, 1000), (2000, 1000)]
    );
    assert_eq!(set.rows[2499]["id"], "o2499");
}

#[test]
fn exact_multiple_of_page_size_needs_one_empty_page() {
    let store = VecStore::with_rows(2000);
    let set = fetch_all(&store, &PageRequest::new("orders"), options(1000, 100_000)).unwrap();
    assert_eq!(set.len(), 2000);
    assert_eq!(store.pages.borrow().len(), 3);
}

#[test]
fn row_cap_truncates_and_flags() {
    let store = VecStore::with_rows(2500);
    let set = fetch_all(&store, &PageRequest::new("orders"), options(1000, 1200)).unwrap();

    assert_eq!(set.len(), 1200);
    assert!(set.truncated);
    assert_eq!(*store.pages.borrow(), vec![(0, 1000), (1000, 200)]);
}

#[test]
fn empty_table_is_one_request() {
    let store = VecStore::with_rows(0);
    let set = fetch_all(&store, &PageRequest::new("orders"), FetchOptions::default()).unwrap();
    assert!(set.is_empty());
    assert!(!set.truncated);
    assert_eq!(store.pages.borrow().len(), 1);
}

#[test]
fn store_errors_propagate() {
    let err = fetch_all(&FailingStore, &PageRequest::new("orders"), FetchOptions::default());
    assert!(matches!(err, Err(AnalyticsError::Fetch { .. })));
}

// ---------------------------------------------------------------------------
// decode_rows
// ---------------------------------------------------------------------------

fn row(value: serde_json::Value) -> Row {
    serde_json::from_value(value).unwrap()
}

#[test]
fn malformed_rows_are_skipped() {
    let rows = vec![
        row(json!({"id": "o1", "created_at": "2024-01-01T10:00:00.000Z", "total_price": 10.5})),
        row(json!({"id": "o2", "created_at": "not a date", "total_price": 3.0})),
        row(json!({"id": "o3", "created_at": "2024-01-02 08:00:00", "total_price": "7.25"})),
        row(json!({"id": 4, "created_at": "2024-01-03", "total_price": null})),
    ];
    let orders: Vec<Order> = decode_rows("orders", rows);

    let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, vec!["o1", "o3", "4"]);
    assert_eq!(orders[1].total_price, 7.25);
    assert_eq!(orders[2].total_price, 0.0);
    assert_eq!(orders[2].created_at, Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
}

// ---------------------------------------------------------------------------
// PostgREST dialect
// ---------------------------------------------------------------------------

#[test]
fn query_pairs_render_postgrest_filters() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let request = PageRequest::new("orders")
        .columns(&["id", "total_price"])
        .scoped(&TenantScope::Tenant("shop-1".into()))
        .gte("created_at", Bound::Timestamp(start))
        .order_asc("created_at")
        .order_desc("id")
        .limit(1000)
        .offset(1000);

    let pairs = query_pairs(&request);
    let expected: Vec<(String, String)> = vec![
        ("select", "id,total_price"),
        ("tenant_id", "eq.shop-1"),
        ("created_at", "gte.2024-01-01T00:00:00.000Z"),
        ("order", "created_at.asc,id.desc"),
        ("limit", "1000"),
        ("offset", "1000"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(pairs, expected);
}

#[test]
fn query_pairs_default_to_all_columns() {
    let pairs = query_pairs(&PageRequest::new("customers"));
    assert_eq!(pairs, vec![("select".to_string(), "*".to_string())]);
}

#[test]
fn rest_store_urls_ignore_trailing_slash() {
    let store = RestStore::new("https://db.example.com/", "anon").unwrap();
    assert_eq!(store.table_url("orders"), "https://db.example.com/rest/v1/orders");
    assert_eq!(store.describe(), "rest(https://db.example.com)");
}

#[test]
fn rest_store_gives_up_after_retries() {
    let timeout = Duration::from_millis(200);
    let store = RestStore::with_policy("http://127.0.0.1:9", "anon", timeout, 1).unwrap();
    match store.fetch_page(&PageRequest::new("orders")) {
        Err(AnalyticsError::Fetch { table, reason }) => {
            assert_eq!(table, "orders");
            assert!(reason.starts_with("2 attempts"));
        }
        other => panic!("expected fetch error, got {:?}", other.map(|r| r.len())),
    }
}

/// Serve `status` with an empty body to every request, counting requests.
fn canned_server(status: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            counter.fetch_add(1, Ordering::SeqCst);
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (url, hits)
}

#[test]
fn missing_rest_table_fails_without_retrying() {
    let (url, hits) = canned_server("404 Not Found");
    let store = RestStore::with_policy(&url, "anon", Duration::from_secs(5), 2).unwrap();

    match store.fetch_page(&PageRequest::new("daily_sales_summary")) {
        Err(AnalyticsError::NotFound(what)) => assert!(what.contains("daily_sales_summary")),
        other => panic!("expected not found, got {:?}", other.map(|r| r.len())),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn client_errors_are_not_retried() {
    let (url, hits) = canned_server("401 Unauthorized");
    let store = RestStore::with_policy(&url, "bad-key", Duration::from_secs(5), 2).unwrap();

    assert!(matches!(
        store.fetch_page(&PageRequest::new("orders")),
        Err(AnalyticsError::Http(_))
    ));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn server_errors_are_retried() {
    let (url, hits) = canned_server("503 Service Unavailable");
    let store = RestStore::with_policy(&url, "anon", Duration::from_secs(5), 2).unwrap();

    match store.fetch_page(&PageRequest::new("orders")) {
        Err(AnalyticsError::Fetch { reason, .. }) => assert!(reason.starts_with("3 attempts")),
        other => panic!("expected fetch error, got {:?}", other.map(|r| r.len())),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 3);
}
