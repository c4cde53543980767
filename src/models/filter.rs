use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnalyticsError, Result};
use crate::range::DateRange;

/// The query contract threaded through every report call.
///
/// Both bounds are inclusive. `start <= end` is checked at construction,
/// including when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawFilter")]
pub struct FilterState {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

/// Wire shape of a filter before its bounds are checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFilter {
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    #[serde(default)]
    segment: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    product: Option<String>,
}

impl TryFrom<RawFilter> for FilterState {
    type Error = AnalyticsError;

    fn try_from(raw: RawFilter) -> Result<Self> {
        let mut filter = FilterState::new(raw.start_date, raw.end_date)?;
        filter.segment = raw.segment;
        filter.channel = raw.channel;
        filter.product = raw.product;
        Ok(filter)
    }
}

impl FilterState {
    pub fn new(start_date: DateTime<Utc>, end_date: DateTime<Utc>) -> Result<Self> {
        if end_date < start_date {
            return Err(AnalyticsError::InvalidArgument(format!(
                "filter end {} is before start {}",
                end_date, start_date
            )));
        }
        Ok(Self {
            start_date,
            end_date,
            segment: None,
            channel: None,
            product: None,
        })
    }

    pub fn from_range(range: &DateRange) -> Self {
        Self {
            start_date: range.start,
            end_date: range.end,
            segment: None,
            channel: None,
            product: None,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Same dimension filters over a different window.
    pub fn with_range(&self, range: &DateRange) -> Self {
        Self {
            start_date: range.start,
            end_date: range.end,
            ..self.clone()
        }
    }

    pub fn with_segment(mut self, segment: &str) -> Self {
        self.segment = Some(segment.to_string());
        self
    }

    pub fn with_channel(mut self, channel: &str) -> Self {
        self.channel = Some(channel.to_string());
        self
    }

    pub fn with_product(mut self, product: &str) -> Self {
        self.product = Some(product.to_string());
        self
    }
}
