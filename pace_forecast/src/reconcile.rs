//! Pickup forecast reconciliation
//!
//! The pickup model assumes the bookings still to come for a future date
//! will mirror what the weekday-aligned date of last year picked up between
//! the same lead time and arrival:
//!
//! ```text
//! pickup   = prior_year_final - prior_year_otb
//! forecast = current_otb + pickup
//! pace     = (current_otb - prior_year_otb) / prior_year_otb * 100
//! ```
//!
//! Statistical and ML models (Prophet, XGBoost, TFT) bring their own point
//! forecast and bounds; [`reconcile_model`] only attaches the historical
//! context and pacing fields and checks the bounds.
//!
//! Nothing here fails. A missing operand, a zero divisor or a non-finite
//! value turns the affected field into `None`.

use crate::data::DateValues;
use crate::error::{PaceError, Result};
use chrono::NaiveDate;
use pace_math::{is_ordered_band, pacing, DaysCountPolicy, RunningTotal};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::Statistics;
use tracing::{debug, warn};

/// Default two-sided coverage of the pickup forecast band
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.8;

/// One forecast row for a single stay date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    #[serde(default)]
    pub current_otb: Option<f64>,
    #[serde(default)]
    pub prior_year_otb: Option<f64>,
    #[serde(default)]
    pub prior_year_final: Option<f64>,
    #[serde(default)]
    pub pickup: Option<f64>,
    #[serde(default)]
    pub forecast: Option<f64>,
    #[serde(default)]
    pub forecast_lower: Option<f64>,
    #[serde(default)]
    pub forecast_upper: Option<f64>,
    #[serde(default)]
    pub pace_vs_prior_pct: Option<f64>,
}

impl ForecastPoint {
    /// An empty row for `date`
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            current_otb: None,
            prior_year_otb: None,
            prior_year_final: None,
            pickup: None,
            forecast: None,
            forecast_lower: None,
            forecast_upper: None,
            pace_vs_prior_pct: None,
        }
    }

    /// A model output row carrying only a point forecast and its bounds
    pub fn model_output(
        date: NaiveDate,
        forecast: Option<f64>,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Self {
        Self {
            forecast,
            forecast_lower: lower,
            forecast_upper: upper,
            ..Self::new(date)
        }
    }

    /// Whether `forecast_lower <= forecast <= forecast_upper` holds for the present members
    pub fn has_ordered_band(&self) -> bool {
        is_ordered_band(self.forecast_lower, self.forecast, self.forecast_upper)
    }
}

/// Settings for the reconciler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Coverage of the pickup forecast band; `None` disables bands
    pub confidence_level: Option<f64>,
    /// How missing days take part in summary averages
    pub days_count_policy: DaysCountPolicy,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            confidence_level: Some(DEFAULT_CONFIDENCE_LEVEL),
            days_count_policy: DaysCountPolicy::default(),
        }
    }
}

impl ReconcileConfig {
    /// Create a validated configuration
    pub fn new(confidence_level: Option<f64>, days_count_policy: DaysCountPolicy) -> Result<Self> {
        let config = Self {
            confidence_level,
            days_count_policy,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(level) = self.confidence_level {
            if !(level > 0.0 && level < 1.0) {
                return Err(PaceError::InvalidParameter(
                    "Confidence level must be between 0 and 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Aggregate figures over a reconciled date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// Every date in the request, with or without data
    pub days_count: usize,
    pub days_with_forecast: usize,
    pub total_current_otb: Option<f64>,
    pub total_prior_year_otb: Option<f64>,
    pub total_prior_year_final: Option<f64>,
    pub total_forecast: Option<f64>,
    pub average_current_otb: Option<f64>,
    pub average_forecast: Option<f64>,
    /// Pace of the summed OTB over dates that have both OTB figures
    pub pace_vs_prior_pct: Option<f64>,
    pub days_forecasting_more: usize,
    pub days_forecasting_less: usize,
    /// Model bands dropped for violating `lower <= forecast <= upper`
    pub invalid_bands: usize,
}

/// Reconciled rows and their summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupForecast {
    pub points: Vec<ForecastPoint>,
    pub summary: ForecastSummary,
}

impl PickupForecast {
    /// Point forecasts in row order
    pub fn forecasts(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.forecast).collect()
    }
}

/// Pickup-model row for one date
pub fn reconcile_point(
    date: NaiveDate,
    current_otb: Option<f64>,
    prior_year_otb: Option<f64>,
    prior_year_final: Option<f64>,
) -> ForecastPoint {
    let current_otb = pacing::present(current_otb);
    let prior_year_otb = pacing::present(prior_year_otb);
    let prior_year_final = pacing::present(prior_year_final);
    let pickup = pacing::pickup(prior_year_final, prior_year_otb);

    ForecastPoint {
        current_otb,
        prior_year_otb,
        prior_year_final,
        pickup,
        forecast: pacing::add(current_otb, pickup),
        pace_vs_prior_pct: pacing::percent_change(current_otb, prior_year_otb),
        ..ForecastPoint::new(date)
    }
}

/// Pickup forecast for every date in `dates`
///
/// The prior-year maps must already be keyed by the future dates they are
/// compared with (see [`crate::comparison::align_to_primary`]).
pub fn reconcile_pickup(
    dates: &[NaiveDate],
    current_otb: &DateValues,
    prior_year_otb: &DateValues,
    prior_year_final: &DateValues,
    config: &ReconcileConfig,
) -> PickupForecast {
    let mut points: Vec<ForecastPoint> = dates
        .iter()
        .map(|d| {
            reconcile_point(
                *d,
                current_otb.get(d).copied(),
                prior_year_otb.get(d).copied(),
                prior_year_final.get(d).copied(),
            )
        })
        .collect();

    if let Some(half_width) = config
        .confidence_level
        .and_then(|level| band_half_width(&points, level))
    {
        for point in points.iter_mut() {
            if let Some(forecast) = point.forecast {
                point.forecast_lower = Some((forecast - half_width).max(0.0).min(forecast));
                point.forecast_upper = Some(forecast + half_width);
            }
        }
    }

    let summary = summarize(&points, config.days_count_policy, 0);
    debug!(
        days = summary.days_count,
        with_forecast = summary.days_with_forecast,
        "reconciled pickup forecast"
    );
    PickupForecast { points, summary }
}

/// Attach history and pacing to an externally produced model forecast
///
/// Historical values come from the maps first and fall back to whatever the
/// model row already carried. A band that is out of order is dropped.
pub fn reconcile_model(
    model_points: &[ForecastPoint],
    current_otb: &DateValues,
    prior_year_otb: &DateValues,
    prior_year_final: &DateValues,
    config: &ReconcileConfig,
) -> PickupForecast {
    let mut invalid_bands = 0;

    let points: Vec<ForecastPoint> = model_points
        .iter()
        .map(|model| {
            let date = model.date;
            let mut point = reconcile_point(
                date,
                current_otb.get(&date).copied().or(model.current_otb),
                prior_year_otb.get(&date).copied().or(model.prior_year_otb),
                prior_year_final
                    .get(&date)
                    .copied()
                    .or(model.prior_year_final),
            );
            point.forecast = pacing::present(model.forecast);
            point.forecast_lower = pacing::present(model.forecast_lower);
            point.forecast_upper = pacing::present(model.forecast_upper);

            if !point.has_ordered_band() {
                warn!(
                    %date,
                    lower = ?point.forecast_lower,
                    forecast = ?point.forecast,
                    upper = ?point.forecast_upper,
                    "dropping out-of-order forecast band"
                );
                point.forecast_lower = None;
                point.forecast_upper = None;
                invalid_bands += 1;
            }
            point
        })
        .collect();

    let summary = summarize(&points, config.days_count_policy, invalid_bands);
    debug!(
        days = summary.days_count,
        invalid_bands, "reconciled model forecast"
    );
    PickupForecast { points, summary }
}

/// Half width of the pickup band: z * sample standard deviation of pickup
///
/// Needs at least two dates with a pickup.
fn band_half_width(points: &[ForecastPoint], confidence_level: f64) -> Option<f64> {
    let pickups: Vec<f64> = points.iter().filter_map(|p| p.pickup).collect();
    if pickups.len() < 2 {
        return None;
    }
    let sigma = pickups.iter().std_dev();
    let z = Normal::new(0.0, 1.0)
        .ok()?
        .inverse_cdf(0.5 + confidence_level / 2.0);
    Some(z * sigma).filter(|w| w.is_finite() && *w >= 0.0)
}

fn summarize(
    points: &[ForecastPoint],
    policy: DaysCountPolicy,
    invalid_bands: usize,
) -> ForecastSummary {
    let current: RunningTotal = points.iter().map(|p| p.current_otb).collect();
    let prior_otb: RunningTotal = points.iter().map(|p| p.prior_year_otb).collect();
    let prior_final: RunningTotal = points.iter().map(|p| p.prior_year_final).collect();
    let forecast: RunningTotal = points.iter().map(|p| p.forecast).collect();

    // Totals-level pace only compares dates that carry both OTB figures
    let (paired_current, paired_prior): (RunningTotal, RunningTotal) = points
        .iter()
        .filter(|p| p.current_otb.is_some() && p.prior_year_otb.is_some())
        .map(|p| (p.current_otb, p.prior_year_otb))
        .unzip();

    let mut days_forecasting_more = 0;
    let mut days_forecasting_less = 0;
    for point in points {
        if let (Some(f), Some(actual)) = (point.forecast, point.prior_year_final) {
            if f > actual {
                days_forecasting_more += 1;
            } else if f < actual {
                days_forecasting_less += 1;
            }
        }
    }

    ForecastSummary {
        days_count: points.len(),
        days_with_forecast: forecast.present_count(),
        total_current_otb: current.total(),
        total_prior_year_otb: prior_otb.total(),
        total_prior_year_final: prior_final.total(),
        total_forecast: forecast.total(),
        average_current_otb: current.average(policy),
        average_forecast: forecast.average(policy),
        pace_vs_prior_pct: pacing::percent_change(paired_current.total(), paired_prior.total()),
        days_forecasting_more,
        days_forecasting_less,
        invalid_bands,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_pickup_point() {
        let point = reconcile_point(date("2024-06-01"), Some(40.0), Some(30.0), Some(50.0));
        assert_eq!(point.pickup, Some(20.0));
        assert_eq!(point.forecast, Some(60.0));
        assert_relative_eq!(point.pace_vs_prior_pct.unwrap(), 33.33, epsilon = 0.01);
    }

    #[test]
    fn test_zero_prior_otb_has_no_pace() {
        let point = reconcile_point(date("2024-06-01"), Some(40.0), Some(0.0), Some(50.0));
        assert_eq!(point.pace_vs_prior_pct, None);
        assert_eq!(point.forecast, Some(90.0));
    }

    #[test]
    fn test_band_needs_two_pickups() {
        let dates = vec![date("2024-06-01"), date("2024-06-02")];
        let current: DateValues = dates.iter().map(|d| (*d, 10.0)).collect();
        let prior_otb: DateValues = [(dates[0], 5.0)].into_iter().collect();
        let prior_final: DateValues = [(dates[0], 15.0)].into_iter().collect();

        let result = reconcile_pickup(
            &dates,
            &current,
            &prior_otb,
            &prior_final,
            &ReconcileConfig::default(),
        );
        assert_eq!(result.points[0].forecast, Some(20.0));
        assert_eq!(result.points[0].forecast_lower, None);
        assert_eq!(result.points[1].forecast, None);
    }

    #[test]
    fn test_config_validation() {
        assert!(ReconcileConfig::new(Some(0.95), DaysCountPolicy::ExcludeMissing).is_ok());
        assert!(ReconcileConfig::new(None, DaysCountPolicy::IncludeMissing).is_ok());
        assert!(ReconcileConfig::new(Some(1.0), DaysCountPolicy::ExcludeMissing).is_err());
        assert!(ReconcileConfig::new(Some(f64::NAN), DaysCountPolicy::ExcludeMissing).is_err());
    }
}
