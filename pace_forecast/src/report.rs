//! Report assembly from providers
//!
//! Ties the pieces together in dependency order: resolve the prior-year
//! window, fetch the three input series, line the prior-year buckets up with
//! the future ones and reconcile. The model comparison fetches each model
//! for the same range and merges them.

use crate::comparison::{align_to_primary, prior_year_date, ComparisonResolver};
use crate::config::PaceConfig;
use crate::data::{Bucket, ComparisonMode, DateRange, MetricSeries};
use crate::error::Result;
use crate::merge::{merge_models, MergedForecastTable, ModelKind, ModelOutput};
use crate::provider::{ForecastModelProvider, MetricsProvider, SnapshotProvider};
use crate::reconcile::{reconcile_pickup, PickupForecast};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// What a pickup report is built for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupRequest {
    /// Future stay dates to forecast
    pub range: DateRange,
    pub bucket: Bucket,
    pub metric: String,
    /// Day the current on-the-books figures are taken from
    pub as_of: NaiveDate,
}

/// Pickup forecast together with the window it was compared against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupReport {
    pub request: PickupRequest,
    pub comparison_range: DateRange,
    pub forecast: PickupForecast,
}

impl PickupReport {
    /// Fetch inputs and reconcile a pickup forecast
    ///
    /// Current OTB is read as of `request.as_of`, prior-year OTB as of the
    /// weekday-aligned day one year earlier, and prior-year finals from
    /// `finals`.
    pub fn build<S, M>(
        snapshots: &S,
        finals: &M,
        request: &PickupRequest,
        config: &PaceConfig,
    ) -> Result<Self>
    where
        S: SnapshotProvider,
        M: MetricsProvider,
    {
        let resolver = ComparisonResolver::new(config.comparison);
        let comparison_range =
            resolver.require(&request.range, ComparisonMode::PreviousYear, request.bucket)?;

        // Bucket starts can precede the range start, so read current OTB over
        // the same bucket-aligned span the forecast dates cover
        let current_span = DateRange::new(
            request.bucket.start_of(request.range.start()),
            request.range.end(),
        )?;
        let current = snapshots.fetch_as_of(&current_span, request.bucket, request.as_of)?;
        let prior_otb = snapshots.fetch_as_of(
            &comparison_range,
            request.bucket,
            prior_year_date(request.as_of),
        )?;
        let prior_final = finals.fetch(&comparison_range, request.bucket)?;

        let dates = request.range.bucket_starts(request.bucket);
        let align = |series: &MetricSeries| {
            align_to_primary(
                &request.range,
                &comparison_range,
                request.bucket,
                series,
                &request.metric,
            )
        };

        let forecast = reconcile_pickup(
            &dates,
            &current.values_of(&request.metric),
            &align(&prior_otb),
            &align(&prior_final),
            &config.reconcile,
        );

        info!(
            range = %request.range,
            comparison = %comparison_range,
            metric = %request.metric,
            days = forecast.summary.days_count,
            "built pickup report"
        );

        Ok(Self {
            request: request.clone(),
            comparison_range,
            forecast,
        })
    }
}

/// Fetch every model for the same range and metric and merge them
pub fn compare_models<P: ForecastModelProvider>(
    provider: &P,
    range: &DateRange,
    metric: &str,
    models: &[ModelKind],
) -> Result<MergedForecastTable> {
    let outputs = models
        .iter()
        .map(|model| {
            provider
                .fetch(range, metric, Some(*model))
                .map(|points| ModelOutput::new(*model, points))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(merge_models(&outputs))
}
