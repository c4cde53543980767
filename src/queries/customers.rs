use super::Source;
use crate::config::CUSTOMERS_TABLE;
use crate::error::Result;
use crate::models::{Customer, FilterState};
use crate::store::{decode_rows, fetch_all, Bound, PageRequest, RowSet};

const CUSTOMER_COLUMNS: [&str; 7] = [
    "id",
    "created_at",
    "first_order_date",
    "last_order_date",
    "total_orders",
    "total_spent",
    "segment",
];

pub struct CustomerQuery<'a> {
    source: Source<'a>,
}

impl<'a> CustomerQuery<'a> {
    pub fn new(source: Source<'a>) -> Self {
        Self { source }
    }

    fn fetch(&self, request: PageRequest) -> Result<RowSet<Customer>> {
        let raw = fetch_all(self.source.store, &request, self.source.options)?;
        Ok(RowSet::new(decode_rows(CUSTOMERS_TABLE, raw.rows), raw.truncated))
    }

    /// Customers who signed up inside the filter window (segment filter applied).
    pub fn signed_up(&self, filter: &FilterState) -> Result<RowSet<Customer>> {
        let request = self
            .source
            .timestamp_window(CUSTOMERS_TABLE, "created_at", filter)
            .columns(&CUSTOMER_COLUMNS)
            .eq_opt("segment", filter.segment.as_deref())
            .order_asc("id");
        self.fetch(request)
    }

    /// Every customer that existed by the end of the filter window.
    pub fn known_by(&self, filter: &FilterState) -> Result<RowSet<Customer>> {
        let request = PageRequest::new(CUSTOMERS_TABLE)
            .columns(&CUSTOMER_COLUMNS)
            .scoped(self.source.scope)
            .lte("created_at", Bound::Timestamp(filter.end_date))
            .eq_opt("segment", filter.segment.as_deref())
            .order_asc("created_at")
            .order_asc("id");
        self.fetch(request)
    }
}
