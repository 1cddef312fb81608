//! # Pace Desk
//!
//! `pace_desk_workspace` bundles the booking pace crates behind one entry
//! point for report pages.
//!
//! ## Example
//!
//! ```
//! use pace_desk_workspace::PaceDesk;
//! use pace_desk_workspace::forecast::{Bucket, ComparisonMode, DateRange};
//!
//! let desk = PaceDesk::new();
//! let march = DateRange::parse("2024-03-01", "2024-03-31").unwrap();
//! let last_year = desk
//!     .comparison_range(&march, ComparisonMode::PreviousYear, Bucket::Day)
//!     .unwrap();
//! assert_eq!(last_year.start().to_string(), "2023-03-03");
//! ```

pub use pace_forecast as forecast;
pub use pace_math as math;

use chrono::NaiveDate;
use pace_forecast::comparison::ComparisonResolver;
use pace_forecast::data::{Bucket, ComparisonMode, DateRange, DateValues};
use pace_forecast::error::Result;
use pace_forecast::merge::{merge_models, MergedForecastTable, ModelOutput};
use pace_forecast::reconcile::{reconcile_model, reconcile_pickup, ForecastPoint, PickupForecast};
use pace_forecast::surface::{build_pickup_surface, LeadSnapshot, PickupSurface};
use pace_forecast::PaceConfig;
use std::path::Path;

/// The four pace computations sharing one configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaceDesk {
    config: PaceConfig,
}

impl PaceDesk {
    /// Creates a desk with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use pace_desk_workspace::PaceDesk;
    ///
    /// let desk = PaceDesk::new();
    /// assert_eq!(desk.config().surface.min_lookback_days, 30);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a desk with a validated configuration.
    pub fn with_config(config: PaceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Creates a desk from a JSON configuration file.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            config: PaceConfig::from_json_file(path)?,
        })
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &PaceConfig {
        &self.config
    }

    /// Comparison range for a report, `None` when no comparison is wanted.
    pub fn comparison_range(
        &self,
        primary: &DateRange,
        mode: ComparisonMode,
        bucket: Bucket,
    ) -> Option<DateRange> {
        ComparisonResolver::new(self.config.comparison).resolve(primary, mode, bucket)
    }

    /// Pickup-model forecast over `dates`.
    pub fn pickup(
        &self,
        dates: &[NaiveDate],
        current_otb: &DateValues,
        prior_year_otb: &DateValues,
        prior_year_final: &DateValues,
    ) -> PickupForecast {
        reconcile_pickup(
            dates,
            current_otb,
            prior_year_otb,
            prior_year_final,
            &self.config.reconcile,
        )
    }

    /// Statistical or ML model forecast with history and pacing attached.
    pub fn model(
        &self,
        model_points: &[ForecastPoint],
        current_otb: &DateValues,
        prior_year_otb: &DateValues,
        prior_year_final: &DateValues,
    ) -> PickupForecast {
        reconcile_model(
            model_points,
            current_otb,
            prior_year_otb,
            prior_year_final,
            &self.config.reconcile,
        )
    }

    /// Current-year vs prior-year lead time surface for one arrival date.
    pub fn surface(
        &self,
        arrival_date: NaiveDate,
        current_year: &[LeadSnapshot],
        prior_year: &[LeadSnapshot],
    ) -> Result<PickupSurface> {
        build_pickup_surface(arrival_date, current_year, prior_year, &self.config.surface)
    }

    /// Several model outputs side by side.
    pub fn merge(&self, outputs: &[ModelOutput]) -> MergedForecastTable {
        merge_models(outputs)
    }
}
