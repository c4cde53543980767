//! Named timeframes, fiscal years and comparison windows.
//!
//! Every range is inclusive on both ends: day ranges run from
//! `00:00:00.000` on the first day to `23:59:59.999` on the last.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{AnalyticsError, Result};
use crate::models::de::parse_date;

/// An inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(AnalyticsError::InvalidArgument(format!(
                "range end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Whole days from `first` through `last`.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Result<Self> {
        Self::new(start_of_day(first), end_of_day(last))
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// Window of the same length ending one millisecond before this one starts.
    pub fn previous_period(&self) -> Self {
        let end = self.start - Duration::milliseconds(1);
        Self {
            start: end - self.duration(),
            end,
        }
    }

    /// Both bounds moved back one calendar year. Feb 29 lands on Feb 28, so
    /// the window length can differ from the original across leap years.
    pub fn previous_year(&self) -> Self {
        Self {
            start: shift_year_back(self.start),
            end: shift_year_back(self.end),
        }
    }
}

fn shift_year_back(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.checked_sub_months(Months::new(12))
        .unwrap_or(ts - Duration::days(365))
}

pub fn start_of_day(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_milli_opt(0, 0, 0, 0)
        .map(|n| n.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

pub fn end_of_day(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_milli_opt(23, 59, 59, 999)
        .map(|n| n.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

// ---------------------------------------------------------------------------
// Timeframe
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    Last90Days,
    Last6Months,
    LastYear,
    ThisMonth,
    LastMonth,
    ThisYear,
    CalendarYear(i32),
    FinancialCurrent,
    FinancialPrevious,
    Custom { first: NaiveDate, last: NaiveDate },
}

impl Timeframe {
    /// Parse a timeframe name. Returns `None` for unknown names.
    ///
    /// Accepts the fixed names, a four-digit calendar year, and
    /// `custom_<YYYY-MM-DD>_<YYYY-MM-DD>` tokens.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let tf = match name {
            "today" => Timeframe::Today,
            "yesterday" => Timeframe::Yesterday,
            "last7days" => Timeframe::Last7Days,
            "last30days" => Timeframe::Last30Days,
            "last90days" => Timeframe::Last90Days,
            "last6months" => Timeframe::Last6Months,
            "lastYear" => Timeframe::LastYear,
            "thisMonth" => Timeframe::ThisMonth,
            "lastMonth" => Timeframe::LastMonth,
            "thisYear" => Timeframe::ThisYear,
            "financial_current" => Timeframe::FinancialCurrent,
            "financial_previous" => Timeframe::FinancialPrevious,
            _ => {
                if name.len() == 4 && name.chars().all(|c| c.is_ascii_digit()) {
                    return name.parse().ok().map(Timeframe::CalendarYear);
                }
                let (first, last) = name.strip_prefix("custom_")?.split_once('_')?;
                return Some(Timeframe::Custom {
                    first: parse_date(first)?,
                    last: parse_date(last)?,
                });
            }
        };
        Some(tf)
    }

    /// Concrete window for this timeframe as of `now`.
    pub fn resolve(&self, settings: &Settings, now: DateTime<Utc>) -> Result<DateRange> {
        let today = now.date_naive();
        let range = match *self {
            Timeframe::Today => DateRange::days(today, today)?,
            Timeframe::Yesterday => {
                let y = today - Duration::days(1);
                DateRange::days(y, y)?
            }
            Timeframe::Last7Days => DateRange::days(today - Duration::days(7), today)?,
            Timeframe::Last30Days => DateRange::days(today - Duration::days(30), today)?,
            Timeframe::Last90Days => DateRange::days(today - Duration::days(90), today)?,
            Timeframe::Last6Months => {
                let first = today.checked_sub_months(Months::new(6)).unwrap_or(today);
                DateRange::days(first, today)?
            }
            Timeframe::LastYear => DateRange::days(today - Duration::days(365), today)?,
            Timeframe::ThisMonth => DateRange::days(today.with_day(1).unwrap_or(today), today)?,
            Timeframe::LastMonth => {
                let this_month = today.with_day(1).unwrap_or(today);
                let last_day = this_month - Duration::days(1);
                DateRange::days(last_day.with_day(1).unwrap_or(last_day), last_day)?
            }
            Timeframe::ThisYear => DateRange::days(ymd_clamped(today.year(), 1, 1)?, today)?,
            Timeframe::CalendarYear(y) => {
                DateRange::days(ymd_clamped(y, 1, 1)?, ymd_clamped(y, 12, 31)?)?
            }
            Timeframe::FinancialCurrent => current_fiscal_year(settings, now)?,
            Timeframe::FinancialPrevious => {
                let current = current_fiscal_year(settings, now)?;
                fiscal_year(
                    &settings.financial_year_start,
                    &settings.financial_year_end,
                    current.start.year() - 1,
                )?
            }
            Timeframe::Custom { first, last } => DateRange::days(first, last)?,
        };
        Ok(range)
    }
}

/// Resolve a timeframe name plus optional explicit bounds.
///
/// Explicit `custom_start`/`custom_end` strings win when both are present and
/// the timeframe is missing or `"custom"`. Unknown or missing names fall back
/// to the current fiscal year.
pub fn resolve_range(
    timeframe: Option<&str>,
    custom_start: Option<&str>,
    custom_end: Option<&str>,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<DateRange> {
    if let (Some(s), Some(e)) = (custom_start, custom_end) {
        if matches!(timeframe, None | Some("custom")) {
            let first = parse_date(s).ok_or_else(|| {
                AnalyticsError::InvalidArgument(format!("invalid custom start '{}'", s))
            })?;
            let last = parse_date(e).ok_or_else(|| {
                AnalyticsError::InvalidArgument(format!("invalid custom end '{}'", e))
            })?;
            return DateRange::days(first, last);
        }
    }

    match timeframe.and_then(Timeframe::parse) {
        Some(tf) => tf.resolve(settings, now),
        None => {
            if let Some(name) = timeframe {
                tracing::debug!(timeframe = name, "unknown timeframe; using current fiscal year");
            }
            current_fiscal_year(settings, now)
        }
    }
}

// ---------------------------------------------------------------------------
// Fiscal years
// ---------------------------------------------------------------------------

/// The fiscal year that starts in `year`.
///
/// When the start month-day falls after the end month-day the year wraps
/// and ends in `year + 1`.
pub fn fiscal_year(start_mmdd: &str, end_mmdd: &str, year: i32) -> Result<DateRange> {
    let (sm, sd) = parse_month_day(start_mmdd)?;
    let (em, ed) = parse_month_day(end_mmdd)?;
    let end_year = if (sm, sd) > (em, ed) { year + 1 } else { year };
    DateRange::days(ymd_clamped(year, sm, sd)?, ymd_clamped(end_year, em, ed)?)
}

/// The fiscal year containing `now`.
pub fn current_fiscal_year(settings: &Settings, now: DateTime<Utc>) -> Result<DateRange> {
    let this = fiscal_year(
        &settings.financial_year_start,
        &settings.financial_year_end,
        now.year(),
    )?;
    if now < this.start {
        fiscal_year(
            &settings.financial_year_start,
            &settings.financial_year_end,
            now.year() - 1,
        )
    } else {
        Ok(this)
    }
}

fn parse_month_day(s: &str) -> Result<(u32, u32)> {
    let invalid = || AnalyticsError::InvalidArgument(format!("invalid MM-DD '{}'", s));
    let (m, d) = s.trim().split_once('-').ok_or_else(invalid)?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    let day: u32 = d.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }
    Ok((month, day))
}

/// Build a date, pulling the day back to the month's last valid day
/// (e.g. `02-29` in a non-leap year).
fn ymd_clamped(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
        .ok_or_else(|| {
            AnalyticsError::InvalidArgument(format!("invalid date {}-{}-{}", year, month, day))
        })
}
