//! Raw-tier order fetches.

use super::Source;
use crate::config::ORDERS_TABLE;
use crate::error::Result;
use crate::models::{FilterState, Order};
use crate::store::{decode_rows, fetch_all, PageRequest, RowSet};

const ORDER_COLUMNS: [&str; 7] = [
    "id",
    "created_at",
    "total_price",
    "customer_id",
    "channel",
    "status",
    "customer_segment",
];

pub struct OrderQuery<'a> {
    source: Source<'a>,
}

impl<'a> OrderQuery<'a> {
    pub fn new(source: Source<'a>) -> Self {
        Self { source }
    }

    /// The request used for a filter: full-timestamp bounds, tenant, and
    /// channel/segment when set.
    pub fn request(&self, filter: &FilterState) -> PageRequest {
        self.source
            .timestamp_window(ORDERS_TABLE, "created_at", filter)
            .columns(&ORDER_COLUMNS)
            .eq_opt("channel", filter.channel.as_deref())
            .eq_opt("customer_segment", filter.segment.as_deref())
            .order_asc("id")
    }

    /// All orders inside the filter window, paginated.
    pub fn in_range(&self, filter: &FilterState) -> Result<RowSet<Order>> {
        let raw = fetch_all(self.source.store, &self.request(filter), self.source.options)?;
        Ok(RowSet::new(decode_rows(ORDERS_TABLE, raw.rows), raw.truncated))
    }
}
