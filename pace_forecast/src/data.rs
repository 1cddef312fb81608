//! Date ranges, buckets and metric series
//!
//! These are the plain values passed between the providers, the pace
//! computations and the rendering layer. Constructors validate; every value
//! that exists satisfies its invariant.

use crate::error::{PaceError, Result};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Values of one metric keyed by date; an absent date means "no data"
pub type DateValues = BTreeMap<NaiveDate, f64>;

/// Inclusive range of calendar dates, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = PaceError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a new range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(PaceError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")?;
        let end = NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")?;
        Self::new(start, end)
    }

    /// A range covering a single day
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive number of days, always at least 1
    pub fn day_count(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date of the range in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Start dates of every bucket overlapping the range
    ///
    /// The first entry is the start of the bucket containing `start`, which
    /// can fall before the range for week and month buckets.
    pub fn bucket_starts(&self, bucket: Bucket) -> Vec<NaiveDate> {
        let mut starts = Vec::new();
        let mut current = Some(bucket.start_of(self.start));
        while let Some(date) = current {
            if date > self.end {
                break;
            }
            starts.push(date);
            current = bucket.next_start(date);
        }
        starts
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Time granularity used to segment a range into data points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    #[default]
    Day,
    /// Weeks start on Monday
    Week,
    Month,
}

impl Bucket {
    /// First date of the bucket containing `date`
    pub fn start_of(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Bucket::Day => date,
            Bucket::Week => week_start(date),
            Bucket::Month => month_start(date),
        }
    }

    /// Start of the bucket following the one that starts at `start`
    pub fn next_start(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Bucket::Day => start.checked_add_days(Days::new(1)),
            Bucket::Week => start.checked_add_days(Days::new(7)),
            Bucket::Month => month_start(start).checked_add_months(Months::new(1)),
        }
    }
}

impl FromStr for Bucket {
    type Err = PaceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" | "d" => Ok(Bucket::Day),
            "week" | "weekly" | "w" => Ok(Bucket::Week),
            "month" | "monthly" | "m" => Ok(Bucket::Month),
            other => Err(PaceError::InvalidParameter(format!(
                "Unsupported bucket: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Bucket::Day => "day",
            Bucket::Week => "week",
            Bucket::Month => "month",
        };
        f.write_str(name)
    }
}

/// Which historical period a range is compared against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    #[default]
    None,
    PreviousPeriod,
    PreviousYear,
}

impl FromStr for ComparisonMode {
    type Err = PaceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(ComparisonMode::None),
            "previous_period" | "period" => Ok(ComparisonMode::PreviousPeriod),
            "previous_year" | "year" => Ok(ComparisonMode::PreviousYear),
            other => Err(PaceError::InvalidParameter(format!(
                "Unsupported comparison mode: {}",
                other
            ))),
        }
    }
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// One row of a metrics series: a bucket start and its named values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: NaiveDate,
    #[serde(default)]
    pub values: BTreeMap<String, f64>,
}

impl MetricPoint {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter for one named value
    pub fn with_value(mut self, metric: &str, value: f64) -> Self {
        self.values.insert(metric.to_string(), value);
        self
    }

    /// Value of `metric`, `None` when absent or not finite
    pub fn value(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied().filter(|v| v.is_finite())
    }
}

/// Points ordered strictly by date; gaps are allowed, duplicates are not
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetricSeries {
    points: Vec<MetricPoint>,
}

impl MetricSeries {
    /// Create a series, rejecting unordered or duplicated dates
    pub fn new(points: Vec<MetricPoint>) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(PaceError::DataError(format!(
                "Series dates must be strictly increasing: {} is followed by {}",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { points })
    }

    /// Load a series from a CSV file with a date column and metric columns
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load a series from any CSV source
    ///
    /// The first column whose header mentions "date" holds `YYYY-MM-DD`
    /// dates; every other column is a metric. Empty cells are absent values.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let date_index = headers
            .iter()
            .position(|h| h.to_lowercase().contains("date"))
            .ok_or_else(|| PaceError::DataError("No date column found in data".to_string()))?;

        let mut points = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            let raw_date = record.get(date_index).unwrap_or_default();
            let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")?;

            let mut point = MetricPoint::new(date);
            for (index, field) in record.iter().enumerate() {
                if index == date_index || field.is_empty() {
                    continue;
                }
                let value = field.parse::<f64>().map_err(|e| {
                    PaceError::DataError(format!(
                        "Row {} column '{}': {}",
                        row + 1,
                        headers.get(index).unwrap_or_default(),
                        e
                    ))
                })?;
                point
                    .values
                    .insert(headers.get(index).unwrap_or_default().to_string(), value);
            }
            points.push(point);
        }

        Self::new(points)
    }

    pub fn points(&self) -> &[MetricPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Point recorded for `date`, if any
    pub fn get(&self, date: NaiveDate) -> Option<&MetricPoint> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|index| &self.points[index])
    }

    /// Project one metric into a date-keyed map, skipping absent values
    pub fn values_of(&self, metric: &str) -> DateValues {
        self.points
            .iter()
            .filter_map(|p| p.value(metric).map(|v| (p.date, v)))
            .collect()
    }

    /// Values of one metric in series order, `None` where absent
    pub fn column(&self, metric: &str) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value(metric)).collect()
    }

    /// Points whose date falls inside `range`
    pub fn within(&self, range: &DateRange) -> MetricSeries {
        MetricSeries {
            points: self
                .points
                .iter()
                .filter(|p| range.contains(p.date))
                .cloned()
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for MetricSeries {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<MetricPoint>::deserialize(deserializer)?;
        MetricSeries::new(points).map_err(serde::de::Error::custom)
    }
}
