//! Lead-time pickup surfaces
//!
//! A surface lays out what was on the books for an arrival date at each
//! lead time (days before arrival), one column per arrival date. It feeds a
//! 3-D chart, so the lead axis always covers a minimum lookback window and
//! the suggested axis range runs from the far lead time down to arrival day.
//! Gaps stay `None`; nothing is interpolated.

use crate::comparison::prior_year_date;
use crate::error::{PaceError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Smallest lead-time window a surface covers
pub const DEFAULT_MIN_LOOKBACK_DAYS: u32 = 30;

/// Extra lead days added to the suggested axis range
pub const DEFAULT_LEAD_PADDING: u32 = 2;

/// Farthest lead time a snapshot may carry, two years of booking window
pub const DEFAULT_MAX_LEAD_DAYS: u32 = 730;

/// On-the-books value recorded `lead_time` days before arrival
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeadSnapshot {
    pub lead_time: u32,
    pub value: Option<f64>,
}

impl LeadSnapshot {
    pub fn new(lead_time: u32, value: Option<f64>) -> Self {
        Self { lead_time, value }
    }
}

/// Settings for surface construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub min_lookback_days: u32,
    pub lead_padding: u32,
    /// Snapshots with a larger lead time are rejected
    pub max_lead_days: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            min_lookback_days: DEFAULT_MIN_LOOKBACK_DAYS,
            lead_padding: DEFAULT_LEAD_PADDING,
            max_lead_days: DEFAULT_MAX_LEAD_DAYS,
        }
    }
}

impl SurfaceConfig {
    /// Create a validated configuration
    pub fn new(min_lookback_days: u32, lead_padding: u32) -> Result<Self> {
        let config = Self {
            min_lookback_days,
            lead_padding,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the lead-time ceiling
    pub fn with_max_lead_days(mut self, max_lead_days: u32) -> Result<Self> {
        self.max_lead_days = max_lead_days;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_lookback_days == 0 {
            return Err(PaceError::InvalidParameter(
                "Minimum lookback must be at least one day".to_string(),
            ));
        }
        if self.max_lead_days < self.min_lookback_days {
            return Err(PaceError::InvalidParameter(format!(
                "Maximum lead time {} is below the minimum lookback {}",
                self.max_lead_days, self.min_lookback_days
            )));
        }
        Ok(())
    }

    /// Reject snapshots whose lead time exceeds `max_lead_days`
    pub fn check_snapshots(&self, snapshots: &[LeadSnapshot]) -> Result<()> {
        match snapshots.iter().find(|s| s.lead_time > self.max_lead_days) {
            Some(s) => Err(PaceError::DataError(format!(
                "Lead time {} exceeds the maximum of {} days",
                s.lead_time, self.max_lead_days
            ))),
            None => Ok(()),
        }
    }
}

/// Axis range for the lead dimension, reversed so arrival day sits in front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRange {
    pub from: u32,
    pub to: u32,
}

/// Lead time × arrival date matrix of on-the-books values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupSurface {
    pub arrival_dates: Vec<NaiveDate>,
    /// `0..=max_lead_time`
    pub lead_times: Vec<u32>,
    /// `grid[lead_index][arrival_index]`
    pub grid: Vec<Vec<Option<f64>>>,
    pub max_lead_time: u32,
    pub suggested_lead_range: LeadRange,
}

impl PickupSurface {
    /// `(lead time rows, arrival date columns)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.lead_times.len(), self.arrival_dates.len())
    }

    pub fn value(&self, lead_time: u32, arrival_index: usize) -> Option<f64> {
        self.grid
            .get(lead_time as usize)
            .and_then(|row| row.get(arrival_index))
            .copied()
            .flatten()
    }

    /// Values of one arrival date from lead 0 upward
    pub fn column(&self, arrival_index: usize) -> Vec<Option<f64>> {
        self.grid
            .iter()
            .map(|row| row.get(arrival_index).copied().flatten())
            .collect()
    }

    /// Bookings gained between `lead_time` and arrival day for one column
    pub fn pickup_since(&self, lead_time: u32, arrival_index: usize) -> Option<f64> {
        pace_math::pickup(
            self.value(0, arrival_index),
            self.value(lead_time, arrival_index),
        )
    }

    /// Whether every cell is empty
    pub fn is_blank(&self) -> bool {
        self.grid.iter().flatten().all(Option::is_none)
    }
}

/// Current-year vs prior-year surface for a single arrival date
///
/// Column 0 is `arrival_date`, column 1 its weekday-aligned date of the
/// previous year. Fails on an invalid config or a snapshot past
/// `config.max_lead_days`.
pub fn build_pickup_surface(
    arrival_date: NaiveDate,
    current_year: &[LeadSnapshot],
    prior_year: &[LeadSnapshot],
    config: &SurfaceConfig,
) -> Result<PickupSurface> {
    config.validate()?;
    config.check_snapshots(current_year)?;
    config.check_snapshots(prior_year)?;
    Ok(build_grid(
        vec![arrival_date, prior_year_date(arrival_date)],
        vec![index_snapshots(current_year), index_snapshots(prior_year)],
        config,
    ))
}

/// Surface with one column per arrival date, in date order
pub fn build_arrival_surface(
    snapshots_by_arrival: &BTreeMap<NaiveDate, Vec<LeadSnapshot>>,
    config: &SurfaceConfig,
) -> Result<PickupSurface> {
    config.validate()?;
    for snapshots in snapshots_by_arrival.values() {
        config.check_snapshots(snapshots)?;
    }
    let (arrival_dates, columns) = snapshots_by_arrival
        .iter()
        .map(|(date, snapshots)| (*date, index_snapshots(snapshots)))
        .unzip();
    Ok(build_grid(arrival_dates, columns, config))
}

/// Present values by lead time; a repeated lead time keeps the last entry
fn index_snapshots(snapshots: &[LeadSnapshot]) -> BTreeMap<u32, f64> {
    snapshots
        .iter()
        .filter_map(|s| {
            s.value
                .filter(|v| v.is_finite())
                .map(|v| (s.lead_time, v))
        })
        .collect()
}

fn build_grid(
    arrival_dates: Vec<NaiveDate>,
    columns: Vec<BTreeMap<u32, f64>>,
    config: &SurfaceConfig,
) -> PickupSurface {
    let observed_max = columns
        .iter()
        .filter_map(|c| c.keys().next_back().copied())
        .max()
        .unwrap_or(0);
    let max_lead_time = observed_max.max(config.min_lookback_days);

    let lead_times: Vec<u32> = (0..=max_lead_time).collect();
    let grid = lead_times
        .iter()
        .map(|lead| columns.iter().map(|c| c.get(lead).copied()).collect::<Vec<_>>())
        .collect();

    debug!(
        arrivals = arrival_dates.len(),
        max_lead_time, "built pickup surface"
    );

    PickupSurface {
        arrival_dates,
        lead_times,
        grid,
        max_lead_time,
        suggested_lead_range: LeadRange {
            from: max_lead_time.saturating_add(config.lead_padding),
            to: 0,
        },
    }
}
