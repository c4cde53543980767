//! Async wrapper around [`MerchantAnalytics`] for use in async runtimes.
//!
//! Every call runs on the blocking thread pool via
//! [`tokio::task::spawn_blocking`]; store reads are blocking I/O.
//!
//! # Example
//!
//! ```no_run
//! use merchant_analytics::{AsyncMerchantAnalytics, Granularity, MerchantAnalytics};
//!
//! #[tokio::main]
//! async fn main() {
//!     let analytics = AsyncMerchantAnalytics::new(
//!         MerchantAnalytics::builder().in_memory().tenant("store-1"),
//!     )
//!     .await
//!     .unwrap();
//!
//!     let filter = analytics
//!         .run(|a| a.resolve(Some("last7days"), None, None))
//!         .await
//!         .unwrap();
//!     let overview = analytics.overview(filter, Granularity::Daily).await.unwrap();
//! }
//! ```

use std::sync::{Arc, Mutex};

use crate::error::{AnalyticsError, Result};
use crate::reports::{ComparisonMode, Overview};
use crate::{FilterState, Granularity, MerchantAnalytics, MerchantAnalyticsBuilder};

/// Async handle sharing one [`MerchantAnalytics`] behind a mutex.
///
/// Cloning is cheap; clones share the same store and settings cache. Calls
/// from any number of clones are serialized on that mutex.
#[derive(Clone)]
pub struct AsyncMerchantAnalytics {
    inner: Arc<Mutex<MerchantAnalytics>>,
}

impl AsyncMerchantAnalytics {
    /// Build on the blocking pool; opening a database touches the disk.
    pub async fn new(builder: MerchantAnalyticsBuilder) -> Result<Self> {
        let analytics = tokio::task::spawn_blocking(move || builder.build())
            .await
            .map_err(|e| AnalyticsError::InvalidArgument(format!("Task join error: {e}")))??;
        Ok(Self::from_sync(analytics))
    }

    pub fn from_sync(analytics: MerchantAnalytics) -> Self {
        Self {
            inner: Arc::new(Mutex::new(analytics)),
        }
    }

    /// Run a sync operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&MerchantAnalytics) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = inner
                .lock()
                .map_err(|_| AnalyticsError::InvalidArgument("analytics lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| AnalyticsError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// The landing-page bundle.
    ///
    /// Each part is its own blocking task, but all of them take the same
    /// lock, so they run one after another rather than in parallel.
    pub async fn overview(
        &self,
        filter: FilterState,
        granularity: Granularity,
    ) -> Result<Overview> {
        let (f1, f2, f3) = (filter.clone(), filter.clone(), filter.clone());
        let (kpis, revenue, channels, segments) = tokio::try_join!(
            self.run(move |a| Ok(a.reports().kpi_comparison(&f1, ComparisonMode::PreviousPeriod))),
            self.run(move |a| Ok(a.reports().revenue_series(&f2, granularity))),
            self.run(move |a| Ok(a.reports().channel_breakdown(&f3))),
            self.run(move |a| Ok(a.reports().segment_breakdown(&filter))),
        )?;
        Ok(Overview {
            kpis,
            revenue,
            channels,
            segments,
        })
    }

    pub async fn refresh_settings(&self) -> Result<crate::Settings> {
        self.run(|a| a.refresh_settings()).await
    }
}
