//! Running totals over sparse daily values
//!
//! Summary cards add up per-day values where some days have no data. A
//! [`RunningTotal`] keeps the sum of the present values apart from the number
//! of days seen, and [`DaysCountPolicy`] decides which of the two an average
//! divides by.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How missing days take part in averages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DaysCountPolicy {
    /// Average over the days that carry a value
    #[default]
    ExcludeMissing,
    /// Average over every day, missing days weigh in as zero
    IncludeMissing,
}

impl FromStr for DaysCountPolicy {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exclude_missing" | "exclude" => Ok(DaysCountPolicy::ExcludeMissing),
            "include_missing" | "include" => Ok(DaysCountPolicy::IncludeMissing),
            other => Err(MathError::InvalidInput(format!(
                "Unknown days count policy: {}",
                other
            ))),
        }
    }
}

/// Sum and day counters for a sparse series
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningTotal {
    sum: f64,
    present: usize,
    days: usize,
}

impl RunningTotal {
    /// Create an empty total
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one day; `None` and non-finite values count as missing
    pub fn push(&mut self, value: Option<f64>) {
        self.days += 1;
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.present += 1;
        }
    }

    /// Sum of the present values, `None` when no day had a value
    pub fn total(&self) -> Option<f64> {
        (self.present > 0).then_some(self.sum)
    }

    /// Number of days recorded, with or without a value
    pub fn days_count(&self) -> usize {
        self.days
    }

    /// Number of days that carried a value
    pub fn present_count(&self) -> usize {
        self.present
    }

    /// Average under the given policy, `None` when nothing can be divided
    pub fn average(&self, policy: DaysCountPolicy) -> Option<f64> {
        let divisor = match policy {
            DaysCountPolicy::ExcludeMissing => self.present,
            DaysCountPolicy::IncludeMissing => self.days,
        };
        if divisor == 0 || self.present == 0 {
            return None;
        }
        Some(self.sum / divisor as f64)
    }

    /// Reset the total, clearing all values
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Extend<Option<f64>> for RunningTotal {
    fn extend<I: IntoIterator<Item = Option<f64>>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl FromIterator<Option<f64>> for RunningTotal {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        let mut total = RunningTotal::new();
        total.extend(iter);
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_missing_days_are_counted_but_not_summed() {
        let total: RunningTotal = vec![Some(10.0), None, Some(20.0), None]
            .into_iter()
            .collect();

        assert_eq!(total.total(), Some(30.0));
        assert_eq!(total.days_count(), 4);
        assert_eq!(total.present_count(), 2);
    }

    #[rstest]
    #[case(DaysCountPolicy::ExcludeMissing, 15.0)]
    #[case(DaysCountPolicy::IncludeMissing, 7.5)]
    fn test_average_policy(#[case] policy: DaysCountPolicy, #[case] expected: f64) {
        let total: RunningTotal = vec![Some(10.0), None, Some(20.0), None]
            .into_iter()
            .collect();

        assert_relative_eq!(total.average(policy).unwrap(), expected);
    }

    #[test]
    fn test_empty_total() {
        let mut total = RunningTotal::new();
        assert_eq!(total.total(), None);
        assert_eq!(total.average(DaysCountPolicy::IncludeMissing), None);

        total.push(None);
        assert_eq!(total.total(), None);
        assert_eq!(total.days_count(), 1);
        assert_eq!(total.average(DaysCountPolicy::IncludeMissing), None);

        total.push(Some(f64::NAN));
        assert_eq!(total.present_count(), 0);

        total.reset();
        assert_eq!(total.days_count(), 0);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "include_missing".parse::<DaysCountPolicy>().unwrap(),
            DaysCountPolicy::IncludeMissing
        );
        assert_eq!(
            "Exclude".parse::<DaysCountPolicy>().unwrap(),
            DaysCountPolicy::ExcludeMissing
        );
        assert!("sometimes".parse::<DaysCountPolicy>().is_err());
    }
}
