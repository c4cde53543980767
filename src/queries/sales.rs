//! Two-tier sales fetch: the precomputed daily summary when it can answer,
//! the raw orders table otherwise.

use std::collections::HashSet;

use super::{LineItemQuery, OrderQuery, Source};
use crate::aggregate::SalesRows;
use crate::config::SUMMARY_TABLE;
use crate::error::Result;
use crate::models::{FilterState, SummaryRow};
use crate::store::{decode_rows, fetch_all, Bound, PageRequest};

pub struct SalesQuery<'a> {
    source: Source<'a>,
}

impl<'a> SalesQuery<'a> {
    pub fn new(source: Source<'a>) -> Self {
        Self { source }
    }

    /// Summary request: bounded by calendar date rather than timestamp.
    pub fn summary_request(&self, filter: &FilterState) -> PageRequest {
        PageRequest::new(SUMMARY_TABLE)
            .scoped(self.source.scope)
            .gte("date", Bound::Date(filter.start_date.date_naive()))
            .lte("date", Bound::Date(filter.end_date.date_naive()))
            .eq_opt("channel", filter.channel.as_deref())
            .eq_opt("customer_segment", filter.segment.as_deref())
            .order_asc("date")
            .order_asc("channel")
            .order_asc("customer_segment")
    }

    /// Summary rows, or `None` when the summary is missing, empty or erroring.
    pub fn summary(&self, filter: &FilterState) -> Option<Vec<SummaryRow>> {
        match fetch_all(self.source.store, &self.summary_request(filter), self.source.options) {
            Ok(set) if !set.is_empty() => {
                let rows: Vec<SummaryRow> = decode_rows(SUMMARY_TABLE, set.rows);
                if rows.is_empty() {
                    None
                } else {
                    Some(rows)
                }
            }
            Ok(_) => {
                let store = self.source.store.describe();
                tracing::debug!(store = %store, "summary empty; using raw orders");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "summary unavailable; using raw orders");
                None
            }
        }
    }

    /// Sales rows for a filter.
    ///
    /// A product filter always goes to the raw tier, since the summary has no
    /// product dimension, and keeps only orders with a matching line item.
    pub fn fetch(&self, filter: &FilterState) -> Result<SalesRows> {
        if filter.product.is_none() {
            if let Some(rows) = self.summary(filter) {
                return Ok(SalesRows::Summary(rows));
            }
        }

        let mut orders = OrderQuery::new(self.source).in_range(filter)?.rows;
        if filter.product.is_some() {
            let items = LineItemQuery::new(self.source).in_range(filter)?;
            let matching: HashSet<&str> = items.rows.iter().map(|i| i.order_id.as_str()).collect();
            orders.retain(|o| matching.contains(o.id.as_str()));
        }
        Ok(SalesRows::Raw(orders))
    }
}
