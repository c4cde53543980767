use super::Source;
use crate::config::LINE_ITEMS_TABLE;
use crate::error::Result;
use crate::models::{FilterState, OrderLineItem};
use crate::store::{decode_rows, fetch_all, PageRequest, RowSet};

pub struct LineItemQuery<'a> {
    source: Source<'a>,
}

impl<'a> LineItemQuery<'a> {
    pub fn new(source: Source<'a>) -> Self {
        Self { source }
    }

    pub fn request(&self, filter: &FilterState) -> PageRequest {
        self.source
            .timestamp_window(LINE_ITEMS_TABLE, "created_at", filter)
            .columns(&[
                "order_id",
                "product_id",
                "product_title",
                "quantity",
                "unit_price",
                "created_at",
            ])
            .eq_opt("product_id", filter.product.as_deref())
            .order_asc("order_id")
            .order_asc("product_id")
    }

    /// Line items of orders placed inside the filter window.
    pub fn in_range(&self, filter: &FilterState) -> Result<RowSet<OrderLineItem>> {
        let raw = fetch_all(self.source.store, &self.request(filter), self.source.options)?;
        Ok(RowSet::new(decode_rows(LINE_ITEMS_TABLE, raw.rows), raw.truncated))
    }
}
