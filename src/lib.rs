//! Merchant analytics core.
//!
//! Turns a tenant's orders, customers, line items and refunds into
//! dashboard-ready series, breakdowns, cohorts, churn scores and KPI
//! comparisons. Rows come from a [`RowStore`]: a local DuckDB database or a
//! PostgREST endpoint. Aggregation happens in-process.
//!
//! # Quick start
//!
//! ```no_run
//! use merchant_analytics::{Granularity, MerchantAnalytics};
//!
//! let analytics = MerchantAnalytics::builder()
//!     .database("analytics.duckdb")
//!     .tenant("store-1")
//!     .build()
//!     .unwrap();
//!
//! let filter = analytics.resolve(Some("last30days"), None, None).unwrap();
//! let series = analytics.reports().revenue_series(&filter, Granularity::Daily);
//! ```

pub mod aggregate;
#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod queries;
pub mod range;
pub mod reports;
pub mod rest;
pub mod sql_builder;
pub mod store;

pub use aggregate::Granularity;
#[cfg(feature = "async")]
pub use async_client::AsyncMerchantAnalytics;
pub use cache::SettingsCache;
pub use config::Settings;
pub use connection::Connection;
pub use error::{AnalyticsError, Result};
pub use models::FilterState;
pub use range::{DateRange, Timeframe};
pub use reports::{ComparisonMode, Overview, ReportQuery};
pub use rest::RestStore;
pub use sql_builder::SqlBuilder;
pub use store::{FetchOptions, RowStore, TenantScope};

use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// MerchantAnalyticsBuilder
// ---------------------------------------------------------------------------

enum Backend {
    Database(PathBuf),
    InMemory,
    Connection(Connection),
    Rest { base_url: String, api_key: String },
    Custom(Box<dyn RowStore + Send>),
}

/// Builder for [`MerchantAnalytics`].
///
/// A tenant (or the explicit all-tenants admin scope) is required. The
/// backend defaults to the DuckDB file under the platform data directory.
pub struct MerchantAnalyticsBuilder {
    backend: Option<Backend>,
    scope: Option<TenantScope>,
    options: FetchOptions,
    settings_ttl: Duration,
}

impl Default for MerchantAnalyticsBuilder {
    fn default() -> Self {
        Self {
            backend: None,
            scope: None,
            options: FetchOptions::default(),
            settings_ttl: config::SETTINGS_TTL,
        }
    }
}

impl MerchantAnalyticsBuilder {
    /// Read from a DuckDB database file, creating it if missing.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.backend = Some(Backend::Database(path.as_ref().to_path_buf()));
        self
    }

    /// Read from a fresh in-memory DuckDB database with the schema installed.
    pub fn in_memory(mut self) -> Self {
        self.backend = Some(Backend::InMemory);
        self
    }

    /// Read from an already-open connection.
    pub fn connection(mut self, conn: Connection) -> Self {
        self.backend = Some(Backend::Connection(conn));
        self
    }

    /// Read from a PostgREST endpoint.
    pub fn rest(mut self, base_url: &str, api_key: &str) -> Self {
        self.backend = Some(Backend::Rest {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
        });
        self
    }

    /// Read from any other [`RowStore`] implementation.
    pub fn store(mut self, store: Box<dyn RowStore + Send>) -> Self {
        self.backend = Some(Backend::Custom(store));
        self
    }

    /// Scope every query to one tenant.
    pub fn tenant(mut self, tenant_id: &str) -> Self {
        self.scope = Some(TenantScope::Tenant(tenant_id.to_string()));
        self
    }

    /// Admin mode: read across every tenant.
    pub fn all_tenants(mut self) -> Self {
        self.scope = Some(TenantScope::AllTenants);
        self
    }

    /// Rows per page. Defaults to 1000.
    pub fn page_size(mut self, n: usize) -> Self {
        self.options.page_size = n;
        self
    }

    /// Maximum rows fetched per table per query. Defaults to 100 000.
    pub fn row_cap(mut self, n: usize) -> Self {
        self.options.row_cap = n;
        self
    }

    /// How long loaded settings stay fresh. Defaults to five minutes.
    pub fn settings_ttl(mut self, ttl: Duration) -> Self {
        self.settings_ttl = ttl;
        self
    }

    pub fn build(self) -> Result<MerchantAnalytics> {
        let scope = self.scope.ok_or_else(|| {
            AnalyticsError::InvalidArgument(
                "a tenant id or all_tenants() is required".to_string(),
            )
        })?;
        if self.options.page_size == 0 {
            return Err(AnalyticsError::InvalidArgument(
                "page size must be positive".to_string(),
            ));
        }

        let store: Box<dyn RowStore + Send> = match self.backend {
            Some(Backend::Database(path)) => Box::new(Connection::open(path)?),
            None => Box::new(Connection::open(config::default_database_path())?),
            Some(Backend::InMemory) => {
                let conn = Connection::open_in_memory()?;
                conn.install_schema()?;
                Box::new(conn)
            }
            Some(Backend::Connection(conn)) => Box::new(conn),
            Some(Backend::Rest { base_url, api_key }) => {
                Box::new(RestStore::new(&base_url, &api_key)?)
            }
            Some(Backend::Custom(store)) => store,
        };
        tracing::debug!(store = %store.describe(), "merchant analytics ready");

        Ok(MerchantAnalytics {
            store,
            scope,
            options: self.options,
            settings: RefCell::new(SettingsCache::new(self.settings_ttl)),
        })
    }
}

// ---------------------------------------------------------------------------
// MerchantAnalytics
// ---------------------------------------------------------------------------

/// Entry point: owns the store and tenant scope and hands out borrowing
/// query wrappers.
pub struct MerchantAnalytics {
    store: Box<dyn RowStore + Send>,
    scope: TenantScope,
    options: FetchOptions,
    settings: RefCell<SettingsCache>,
}

impl MerchantAnalytics {
    pub fn builder() -> MerchantAnalyticsBuilder {
        MerchantAnalyticsBuilder::default()
    }

    pub fn source(&self) -> queries::Source<'_> {
        queries::Source::new(self.store.as_ref(), &self.scope, self.options)
    }

    pub fn scope(&self) -> &TenantScope {
        &self.scope
    }

    pub fn store(&self) -> &dyn RowStore {
        self.store.as_ref()
    }

    // -- Row accessors -----------------------------------------------------

    pub fn orders(&self) -> queries::OrderQuery<'_> {
        queries::OrderQuery::new(self.source())
    }

    /// Sales rows, summary tier first.
    pub fn sales(&self) -> queries::SalesQuery<'_> {
        queries::SalesQuery::new(self.source())
    }

    pub fn customers(&self) -> queries::CustomerQuery<'_> {
        queries::CustomerQuery::new(self.source())
    }

    pub fn line_items(&self) -> queries::LineItemQuery<'_> {
        queries::LineItemQuery::new(self.source())
    }

    pub fn refunds(&self) -> queries::RefundQuery<'_> {
        queries::RefundQuery::new(self.source())
    }

    // -- Reports -----------------------------------------------------------

    /// Report facade anchored at the current time.
    pub fn reports(&self) -> ReportQuery<'_> {
        self.reports_at(Utc::now())
    }

    /// Report facade anchored at `now`.
    ///
    /// Settings that fail to load fall back to defaults with a warning.
    pub fn reports_at(&self, now: DateTime<Utc>) -> ReportQuery<'_> {
        let settings = self.settings().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "settings unavailable; using defaults");
            Settings::default()
        });
        ReportQuery::new(self.source(), settings, now)
    }

    // -- Settings and ranges -----------------------------------------------

    /// Tenant settings, served from the cache while fresh.
    pub fn settings(&self) -> Result<Settings> {
        let source = self.source();
        self.settings
            .borrow_mut()
            .get_or_load(Instant::now(), || queries::SettingsQuery::new(source).load())
    }

    /// Drop cached settings and load them again.
    pub fn refresh_settings(&self) -> Result<Settings> {
        self.settings.borrow_mut().clear();
        self.settings()
    }

    /// Resolve a timeframe name or explicit bounds into a filter, as of now.
    pub fn resolve(
        &self,
        timeframe: Option<&str>,
        custom_start: Option<&str>,
        custom_end: Option<&str>,
    ) -> Result<FilterState> {
        self.resolve_at(timeframe, custom_start, custom_end, Utc::now())
    }

    pub fn resolve_at(
        &self,
        timeframe: Option<&str>,
        custom_start: Option<&str>,
        custom_end: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<FilterState> {
        let settings = self.settings()?;
        let range = range::resolve_range(timeframe, custom_start, custom_end, &settings, now)?;
        Ok(FilterState::from_range(&range))
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for MerchantAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match &self.scope {
            TenantScope::Tenant(id) => id.as_str(),
            TenantScope::AllTenants => "*",
        };
        write!(
            f,
            "MerchantAnalytics(store={}, tenant={}, page_size={}, row_cap={})",
            self.store.describe(),
            scope,
            self.options.page_size,
            self.options.row_cap
        )
    }
}
