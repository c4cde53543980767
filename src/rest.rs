//! Hosted-database store speaking the PostgREST query dialect.
//!
//! Requests become `GET {base}/rest/v1/{table}?select=...&col=gte.value`
//! calls. Each page is attempted once plus a fixed number of retries with a
//! fixed per-request timeout and no backoff. Only transport failures and 5xx
//! responses are retried; a 404 is [`AnalyticsError::NotFound`] and any other
//! client error fails at once.

use crate::config;
use crate::error::{AnalyticsError, Result};
use crate::store::{Op, PageRequest, Row, RowStore};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

pub struct RestStore {
    base_url: String,
    api_key: String,
    retries: u32,
    client: Client,
}

impl RestStore {
    /// Create a store with the default timeout and retry count.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_policy(base_url, api_key, config::REST_TIMEOUT, config::REST_RETRIES)
    }

    pub fn with_policy(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
        retries: u32,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            retries,
            client,
        })
    }

    /// Endpoint for a table.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn send(&self, url: &str, pairs: &[(String, String)]) -> Result<Vec<Row>> {
        let resp = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(pairs)
            .send()?
            .error_for_status()?;
        Ok(resp.json()?)
    }

    fn fetch_with_retry(&self, request: &PageRequest) -> Result<Vec<Row>> {
        let url = self.table_url(&request.table);
        let pairs = query_pairs(request);
        let mut last_error = String::new();

        for attempt in 0..=self.retries {
            match self.send(&url, &pairs) {
                Ok(rows) => return Ok(rows),
                Err(AnalyticsError::Http(e)) if !is_retryable(&e) => {
                    return Err(permanent_error(&request.table, e));
                }
                Err(e) => {
                    tracing::warn!(
                        table = %request.table,
                        attempt = attempt + 1,
                        error = %e,
                        "rest fetch failed"
                    );
                    last_error = e.to_string();
                }
            }
        }

        Err(AnalyticsError::Fetch {
            table: request.table.clone(),
            reason: format!("{} attempts exhausted: {}", self.retries + 1, last_error),
        })
    }
}

/// Transport failures and server errors may pass; anything else will not.
fn is_retryable(e: &reqwest::Error) -> bool {
    match e.status() {
        Some(status) => status.is_server_error(),
        None => !e.is_decode(),
    }
}

fn permanent_error(table: &str, e: reqwest::Error) -> AnalyticsError {
    if e.status() == Some(StatusCode::NOT_FOUND) {
        AnalyticsError::NotFound(format!("table '{}'", table))
    } else {
        AnalyticsError::Http(e)
    }
}

impl RowStore for RestStore {
    fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Row>> {
        self.fetch_with_retry(request)
    }

    fn describe(&self) -> String {
        format!("rest({})", self.base_url)
    }
}

/// Render a request as PostgREST query parameters.
pub fn query_pairs(request: &PageRequest) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    let select = if request.columns.is_empty() {
        "*".to_string()
    } else {
        request.columns.join(",")
    };
    pairs.push(("select".to_string(), select));

    for cond in &request.conditions {
        let op = match cond.op {
            Op::Eq => "eq",
            Op::Gte => "gte",
            Op::Lte => "lte",
        };
        pairs.push((cond.column.clone(), format!("{}.{}", op, cond.value.to_iso())));
    }

    if !request.order_by.is_empty() {
        let order: Vec<String> = request
            .order_by
            .iter()
            .map(|(col, asc)| format!("{}.{}", col, if *asc { "asc" } else { "desc" }))
            .collect();
        pairs.push(("order".to_string(), order.join(",")));
    }

    if let Some(n) = request.limit {
        pairs.push(("limit".to_string(), n.to_string()));
    }
    if let Some(n) = request.offset {
        pairs.push(("offset".to_string(), n.to_string()));
    }

    pairs
}
