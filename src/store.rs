//! Store-neutral row fetching.
//!
//! A [`RowStore`] answers one page of a [`PageRequest`] at a time. The
//! embedded DuckDB [`Connection`](crate::connection::Connection) and the
//! hosted [`RestStore`](crate::rest::RestStore) both implement it, and
//! [`fetch_all`] layers fixed-size pagination and a row cap on top.

use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// One row as returned by a store, keyed by column name.
pub type Row = HashMap<String, Value>;

/// A typed comparison value. Stores render it in their own dialect.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Bound {
    /// Plain rendering used for SQL parameters: `YYYY-MM-DD` for dates,
    /// `YYYY-MM-DD HH:MM:SS.mmm` for timestamps.
    pub fn to_sql_param(&self) -> String {
        match self {
            Bound::Text(s) => s.clone(),
            Bound::Date(d) => d.format("%Y-%m-%d").to_string(),
            Bound::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string(),
        }
    }

    /// ISO 8601 rendering used on the wire.
    pub fn to_iso(&self) -> String {
        match self {
            Bound::Timestamp(ts) => ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            other => other.to_sql_param(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Gte,
    Lte,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: Op,
    pub value: Bound,
}

/// Which tenants a request may read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantScope {
    Tenant(String),
    /// Admin view across every merchant. Only reachable through
    /// [`MerchantAnalyticsBuilder::all_tenants`](crate::MerchantAnalyticsBuilder::all_tenants).
    AllTenants,
}

impl TenantScope {
    pub fn tenant_id(&self) -> Option<&str> {
        match self {
            TenantScope::Tenant(id) => Some(id),
            TenantScope::AllTenants => None,
        }
    }
}

/// A single-table, filter-and-page request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub table: String,
    pub columns: Vec<String>,
    pub conditions: Vec<Condition>,
    /// `(column, ascending)` pairs.
    pub order_by: Vec<(String, bool)>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageRequest {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn filter(mut self, column: &str, op: Op, value: Bound) -> Self {
        self.conditions.push(Condition {
            column: column.to_string(),
            op,
            value,
        });
        self
    }

    pub fn eq(self, column: &str, value: &str) -> Self {
        self.filter(column, Op::Eq, Bound::Text(value.to_string()))
    }

    /// Add an equality condition only when `value` is set.
    pub fn eq_opt(self, column: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn gte(self, column: &str, value: Bound) -> Self {
        self.filter(column, Op::Gte, value)
    }

    pub fn lte(self, column: &str, value: Bound) -> Self {
        self.filter(column, Op::Lte, value)
    }

    /// Restrict to the tenant, or leave unrestricted for the admin scope.
    pub fn scoped(self, scope: &TenantScope) -> Self {
        match scope.tenant_id() {
            Some(id) => self.eq("tenant_id", id),
            None => self,
        }
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order_by.push((column.to_string(), true));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order_by.push((column.to_string(), false));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }
}

/// Backing store that can answer a single page of a request.
pub trait RowStore {
    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Row>>;

    /// Short human-readable description for logs and `Display`.
    fn describe(&self) -> String;
}

/// Pagination limits for [`fetch_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub page_size: usize,
    pub row_cap: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: crate::config::DEFAULT_PAGE_SIZE,
            row_cap: crate::config::DEFAULT_ROW_CAP,
        }
    }
}

/// Rows from one accessor call, with a flag set when the row cap cut the
/// result short.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet<T> {
    pub rows: Vec<T>,
    pub truncated: bool,
}

impl<T> RowSet<T> {
    pub fn new(rows: Vec<T>, truncated: bool) -> Self {
        Self { rows, truncated }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

impl<T> Default for RowSet<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            truncated: false,
        }
    }
}

/// Page through `request` until a short page or the row cap.
///
/// Any limit/offset already on the request is replaced. Errors from the
/// store propagate unchanged.
pub fn fetch_all(
    store: &dyn RowStore,
    request: &PageRequest,
    options: FetchOptions,
) -> Result<RowSet<Row>> {
    let page_size = options.page_size.max(1);
    let mut rows: Vec<Row> = Vec::new();
    let mut truncated = false;

    loop {
        let remaining = options.row_cap.saturating_sub(rows.len());
        if remaining == 0 {
            truncated = true;
            break;
        }
        let size = page_size.min(remaining);
        let page = store.fetch_page(&request.clone().limit(size).offset(rows.len()))?;
        let got = page.len();
        rows.extend(page);
        if got < size {
            break;
        }
    }

    if truncated {
        tracing::warn!(
            table = %request.table,
            row_cap = options.row_cap,
            "row cap reached; result truncated"
        );
    } else if rows.len() == page_size {
        tracing::warn!(
            table = %request.table,
            page_size,
            "result size equals the page size; the backend may be capping rows"
        );
    }

    Ok(RowSet::new(rows, truncated))
}

/// Deserialize rows into `T`, skipping (and logging) malformed ones.
pub fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Row>) -> Vec<T> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let value = Value::Object(row.into_iter().collect());
        match serde_json::from_value::<T>(value) {
            Ok(item) => out.push(item),
            Err(e) => tracing::warn!(table, error = %e, "skipping malformed row"),
        }
    }
    out
}
