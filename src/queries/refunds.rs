use super::Source;
use crate::config::REFUNDS_TABLE;
use crate::error::Result;
use crate::models::{FilterState, Refund};
use crate::store::{decode_rows, fetch_all, RowSet};

pub struct RefundQuery<'a> {
    source: Source<'a>,
}

impl<'a> RefundQuery<'a> {
    pub fn new(source: Source<'a>) -> Self {
        Self { source }
    }

    /// Refunds issued inside the filter window.
    pub fn in_range(&self, filter: &FilterState) -> Result<RowSet<Refund>> {
        let request = self
            .source
            .timestamp_window(REFUNDS_TABLE, "created_at", filter)
            .columns(&["order_id", "amount", "created_at"])
            .order_asc("order_id");
        let raw = fetch_all(self.source.store, &request, self.source.options)?;
        Ok(RowSet::new(decode_rows(REFUNDS_TABLE, raw.rows), raw.truncated))
    }
}
