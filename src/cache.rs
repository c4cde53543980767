//! Short-lived settings cache.
//!
//! Holds a single [`Settings`] entry with the time it was loaded. The owner
//! decides when to reload: [`SettingsCache::is_stale`] reports whether the
//! entry is missing or older than the TTL, and [`SettingsCache::get_or_load`]
//! reloads through a caller-supplied loader when it is.

use crate::config::{self, Settings};
use crate::error::Result;
use std::time::{Duration, Instant};

pub struct SettingsCache {
    ttl: Duration,
    entry: Option<(Settings, Instant)>,
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new(config::SETTINGS_TTL)
    }
}

impl SettingsCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// True when nothing is cached or the entry has outlived the TTL at `now`.
    pub fn is_stale(&self, now: Instant) -> bool {
        match &self.entry {
            None => true,
            Some((_, loaded_at)) => now.saturating_duration_since(*loaded_at) >= self.ttl,
        }
    }

    /// Cached settings if still fresh at `now`.
    pub fn get(&self, now: Instant) -> Option<&Settings> {
        if self.is_stale(now) {
            return None;
        }
        self.entry.as_ref().map(|(s, _)| s)
    }

    /// Store a freshly loaded entry.
    pub fn put(&mut self, settings: Settings, now: Instant) {
        self.entry = Some((settings, now));
    }

    /// Return the cached entry, reloading it first when stale.
    ///
    /// A failed load leaves any previous entry untouched and propagates the
    /// error.
    pub fn get_or_load<F>(&mut self, now: Instant, load: F) -> Result<Settings>
    where
        F: FnOnce() -> Result<Settings>,
    {
        if let Some(s) = self.get(now) {
            return Ok(s.clone());
        }
        let fresh = load()?;
        tracing::debug!(ttl_secs = self.ttl.as_secs(), "settings cache refreshed");
        self.put(fresh.clone(), now);
        Ok(fresh)
    }

    /// Drop the cached entry so the next read reloads.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}
