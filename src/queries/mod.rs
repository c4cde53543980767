//! Row-source accessors.
//!
//! Each query struct borrows a [`Source`] (store, tenant scope and
//! pagination limits) and returns typed rows. Errors from the raw tables
//! propagate as `Err`; only the summary tier swallows its own failures.

pub mod customers;
pub mod line_items;
pub mod orders;
pub mod refunds;
pub mod sales;
pub mod settings;

pub use customers::CustomerQuery;
pub use line_items::LineItemQuery;
pub use orders::OrderQuery;
pub use refunds::RefundQuery;
pub use sales::SalesQuery;
pub use settings::SettingsQuery;

use crate::models::FilterState;
use crate::store::{Bound, FetchOptions, PageRequest, RowStore, TenantScope};

/// Everything an accessor needs to reach the backing store.
#[derive(Clone, Copy)]
pub struct Source<'a> {
    pub store: &'a dyn RowStore,
    pub scope: &'a TenantScope,
    pub options: FetchOptions,
}

impl<'a> Source<'a> {
    pub fn new(store: &'a dyn RowStore, scope: &'a TenantScope, options: FetchOptions) -> Self {
        Self { store, scope, options }
    }

    /// Tenant-scoped request bounded by `column` over the filter's full
    /// timestamps, oldest first.
    pub(crate) fn timestamp_window(
        &self,
        table: &str,
        column: &str,
        filter: &FilterState,
    ) -> PageRequest {
        PageRequest::new(table)
            .scoped(self.scope)
            .gte(column, Bound::Timestamp(filter.start_date))
            .lte(column, Bound::Timestamp(filter.end_date))
            .order_asc(column)
    }
}
