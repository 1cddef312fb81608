//! # Pace Forecast
//!
//! Period comparison and pickup forecasting for hotel booking pace reports.
//!
//! ## Features
//!
//! - Comparison ranges for previous-period and year-over-year views, aligned
//!   by weekday for day/week buckets and by calendar month for month buckets
//! - Pickup model forecasts: current on-the-books plus last year's pickup,
//!   with pacing deltas, uncertainty bands and summary totals
//! - Validation of statistical/ML model bands (Prophet, XGBoost, TFT)
//! - Lead time × arrival date pickup surfaces
//! - Side-by-side merge of several models with accuracy metrics
//!
//! All computations are pure functions over already-fetched series. Missing
//! data propagates as `None`; none of them fail.
//!
//! ## Quick Start
//!
//! ```rust
//! use pace_forecast::comparison::resolve_comparison_range;
//! use pace_forecast::data::{Bucket, ComparisonMode, DateRange};
//! use pace_forecast::reconcile::reconcile_point;
//!
//! let march = DateRange::parse("2024-03-01", "2024-03-31")?;
//! let last_year = resolve_comparison_range(&march, ComparisonMode::PreviousYear, Bucket::Day)
//!     .expect("previous year always resolves");
//! assert_eq!(last_year.start().to_string(), "2023-03-03");
//!
//! let point = reconcile_point(march.start(), Some(40.0), Some(30.0), Some(50.0));
//! assert_eq!(point.forecast, Some(60.0));
//! # Ok::<(), pace_forecast::PaceError>(())
//! ```

pub mod comparison;
pub mod config;
pub mod data;
pub mod error;
pub mod merge;
pub mod metrics;
pub mod provider;
pub mod reconcile;
pub mod report;
pub mod surface;

// Re-export commonly used types
pub use crate::comparison::{resolve_comparison_range, ComparisonResolver};
pub use crate::config::PaceConfig;
pub use crate::data::{Bucket, ComparisonMode, DateRange, MetricPoint, MetricSeries};
pub use crate::error::PaceError;
pub use crate::merge::{merge_models, MergedForecastTable, ModelKind};
pub use crate::reconcile::{reconcile_model, reconcile_pickup, ForecastPoint, PickupForecast};
pub use crate::surface::{build_pickup_surface, PickupSurface};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
