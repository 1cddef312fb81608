//! Comparison range resolution
//!
//! Given the range a report shows, work out the historical range it is
//! compared against. Year-over-year comparisons for day and week buckets
//! step back 364 days (52 whole weeks) so weekdays line up; month buckets
//! step back to the same calendar month of the previous year.

use crate::data::{month_start, Bucket, ComparisonMode, DateRange, DateValues, MetricSeries};
use crate::error::{PaceError, Result};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Days between a date and its weekday-aligned counterpart one year earlier
pub const YEAR_OFFSET_DAYS: u64 = 364;

/// How the end of a month-bucketed year-over-year comparison is found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthAlignment {
    /// Same number of days as the primary range, counted from the
    /// comparison start
    #[default]
    DayCount,
    /// Through the end of the same calendar month as the primary end,
    /// one year earlier
    CalendarMonths,
}

/// Settings for [`ComparisonResolver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    pub month_alignment: MonthAlignment,
}

/// Resolves comparison ranges under a fixed configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct ComparisonResolver {
    config: ComparisonConfig,
}

impl ComparisonResolver {
    pub fn new(config: ComparisonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComparisonConfig {
        &self.config
    }

    /// Range to fetch for comparison, `None` when `mode` is `None`
    ///
    /// Also `None` when the window cannot be represented, which only happens
    /// for primary ranges starting within a year of `NaiveDate::MIN`. Use
    /// [`require`](Self::require) to tell the two apart.
    pub fn resolve(
        &self,
        primary: &DateRange,
        mode: ComparisonMode,
        bucket: Bucket,
    ) -> Option<DateRange> {
        let period_days = primary.day_count();

        let resolved = match mode {
            ComparisonMode::None => None,
            ComparisonMode::PreviousPeriod => {
                let end = primary.start().checked_sub_days(Days::new(1))?;
                let start = end.checked_sub_days(Days::new(period_days - 1))?;
                Some((start, end))
            }
            ComparisonMode::PreviousYear => {
                let start = match bucket {
                    Bucket::Day => primary.start().checked_sub_days(Days::new(YEAR_OFFSET_DAYS))?,
                    Bucket::Week => Bucket::Week.start_of(
                        primary.start().checked_sub_days(Days::new(YEAR_OFFSET_DAYS))?,
                    ),
                    Bucket::Month => {
                        month_start(primary.start()).checked_sub_months(Months::new(12))?
                    }
                };
                let end = match (bucket, self.config.month_alignment) {
                    (Bucket::Month, MonthAlignment::CalendarMonths) => {
                        calendar_month_end(start, months_spanned(primary))?
                    }
                    _ => start.checked_add_days(Days::new(period_days - 1))?,
                };
                Some((start, end))
            }
        };

        let range = resolved.and_then(|(start, end)| DateRange::new(start, end).ok());
        debug!(
            primary = %primary,
            ?mode,
            %bucket,
            comparison = ?range.map(|r| r.to_string()),
            "resolved comparison range"
        );
        range
    }

    /// Like [`resolve`](Self::resolve) but fails instead of returning `None`
    ///
    /// `ComparisonMode::None` is an `InvalidParameter`; a window that would
    /// fall outside chrono's date range is an `InvalidRange`.
    pub fn require(
        &self,
        primary: &DateRange,
        mode: ComparisonMode,
        bucket: Bucket,
    ) -> Result<DateRange> {
        if mode == ComparisonMode::None {
            return Err(PaceError::InvalidParameter(format!(
                "No comparison range for {} with mode {:?}",
                primary, mode
            )));
        }
        self.resolve(primary, mode, bucket).ok_or_else(|| {
            PaceError::InvalidRange(format!(
                "{:?} comparison for {} falls outside the supported date range",
                mode, primary
            ))
        })
    }
}

/// Comparison range under the default configuration
pub fn resolve_comparison_range(
    primary: &DateRange,
    mode: ComparisonMode,
    bucket: Bucket,
) -> Option<DateRange> {
    ComparisonResolver::default().resolve(primary, mode, bucket)
}

/// Weekday-aligned counterpart of `date` one year earlier
///
/// Saturates at `NaiveDate::MIN` for dates within 364 days of it.
pub fn prior_year_date(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(YEAR_OFFSET_DAYS))
        .unwrap_or(NaiveDate::MIN)
}

fn months_spanned(range: &DateRange) -> u32 {
    let index = |d: NaiveDate| d.year() * 12 + d.month0() as i32;
    (index(range.end()) - index(range.start())).max(0) as u32
}

/// Last day of the month `months` months after the month of `start`
fn calendar_month_end(start: NaiveDate, months: u32) -> Option<NaiveDate> {
    month_start(start)
        .checked_add_months(Months::new(months + 1))?
        .checked_sub_days(Days::new(1))
}

/// Re-key a comparison series onto the primary range by bucket position
///
/// The i-th bucket of `comparison` maps to the i-th bucket of `primary`.
/// Buckets missing from the series stay absent, and comparison buckets
/// beyond the primary's bucket count are dropped.
pub fn align_to_primary(
    primary: &DateRange,
    comparison: &DateRange,
    bucket: Bucket,
    series: &MetricSeries,
    metric: &str,
) -> DateValues {
    let primary_starts = primary.bucket_starts(bucket);
    comparison
        .bucket_starts(bucket)
        .into_iter()
        .zip(primary_starts)
        .filter_map(|(comparison_date, primary_date)| {
            series
                .get(comparison_date)
                .and_then(|p| p.value(metric))
                .map(|v| (primary_date, v))
        })
        .collect()
}

/// Pair `dates` with `values` by index, skipping missing values
///
/// Positions past the end of `values` have no entry.
pub fn align_by_position(dates: &[NaiveDate], values: &[Option<f64>]) -> DateValues {
    dates
        .iter()
        .zip(values.iter())
        .filter_map(|(d, v)| v.filter(|v| v.is_finite()).map(|v| (*d, v)))
        .collect()
}
