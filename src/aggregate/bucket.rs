//! Time-bucket keys.
//!
//! Every key format is zero-padded so lexicographic order is chronological.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AnalyticsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl FromStr for Granularity {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(Granularity::Daily),
            "weekly" | "week" => Ok(Granularity::Weekly),
            "monthly" | "month" => Ok(Granularity::Monthly),
            "quarterly" | "quarter" => Ok(Granularity::Quarterly),
            "yearly" | "year" => Ok(Granularity::Yearly),
            other => Err(AnalyticsError::InvalidArgument(format!(
                "unknown granularity '{}'",
                other
            ))),
        }
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// First month (1-based) of the quarter containing `month` (1-based).
pub fn quarter_start_month(month: u32) -> u32 {
    let quarter = (month - 1) / 3 + 1;
    (quarter - 1) * 3 + 1
}

/// Bucket key for a timestamp:
/// `YYYY-MM-DD` (daily, and Monday week-start for weekly), `YYYY-MM`
/// (monthly, and quarter-start month for quarterly) or `YYYY`.
pub fn bucket_key(ts: DateTime<Utc>, granularity: Granularity) -> String {
    let date = ts.date_naive();
    match granularity {
        Granularity::Daily => date.format("%Y-%m-%d").to_string(),
        Granularity::Weekly => week_start(date).format("%Y-%m-%d").to_string(),
        Granularity::Monthly => format!("{:04}-{:02}", date.year(), date.month()),
        Granularity::Quarterly => {
            format!("{:04}-{:02}", date.year(), quarter_start_month(date.month()))
        }
        Granularity::Yearly => format!("{:04}", date.year()),
    }
}

/// `YYYY-MM` of a timestamp.
pub fn month_key(ts: DateTime<Utc>) -> String {
    bucket_key(ts, Granularity::Monthly)
}
