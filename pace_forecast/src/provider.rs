//! Data provider contracts
//!
//! The pace computations never fetch anything themselves. Callers fetch the
//! series through these traits (typically concurrently, over HTTP) and hand
//! the results over as plain values. The in-memory implementations serve
//! tests and offline use.

use crate::data::{Bucket, DateRange, MetricSeries};
use crate::error::{PaceError, Result};
use crate::merge::ModelKind;
use crate::reconcile::ForecastPoint;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Final (realized) metrics, one row per bucket start in range
pub trait MetricsProvider {
    fn fetch(&self, range: &DateRange, bucket: Bucket) -> Result<MetricSeries>;
}

/// On-the-books metrics as they were recorded on a given day
pub trait SnapshotProvider {
    fn fetch_as_of(&self, range: &DateRange, bucket: Bucket, as_of: NaiveDate)
        -> Result<MetricSeries>;
}

/// Point forecasts, with optional bounds, from a forecasting model
pub trait ForecastModelProvider {
    /// `model = None` asks for the provider's default model
    fn fetch(
        &self,
        range: &DateRange,
        metric: &str,
        model: Option<ModelKind>,
    ) -> Result<Vec<ForecastPoint>>;
}

/// Metrics held in memory, one series per bucket size
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetrics {
    series: HashMap<Bucket, MetricSeries>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, bucket: Bucket, series: MetricSeries) -> Self {
        self.series.insert(bucket, series);
        self
    }
}

impl MetricsProvider for InMemoryMetrics {
    fn fetch(&self, range: &DateRange, bucket: Bucket) -> Result<MetricSeries> {
        self.series
            .get(&bucket)
            .map(|s| s.within(range))
            .ok_or_else(|| PaceError::ProviderError(format!("No {} series loaded", bucket)))
    }
}

/// On-the-books snapshots held in memory, keyed by recording date
///
/// A query as of a date answers from the latest snapshot recorded on or
/// before it; with no such snapshot the answer is an empty series.
#[derive(Debug, Clone)]
pub struct InMemorySnapshots {
    bucket: Bucket,
    snapshots: BTreeMap<NaiveDate, MetricSeries>,
}

impl InMemorySnapshots {
    pub fn new(bucket: Bucket) -> Self {
        Self {
            bucket,
            snapshots: BTreeMap::new(),
        }
    }

    pub fn with_snapshot(mut self, recorded_on: NaiveDate, series: MetricSeries) -> Self {
        self.snapshots.insert(recorded_on, series);
        self
    }
}

impl SnapshotProvider for InMemorySnapshots {
    fn fetch_as_of(
        &self,
        range: &DateRange,
        bucket: Bucket,
        as_of: NaiveDate,
    ) -> Result<MetricSeries> {
        if bucket != self.bucket {
            return Err(PaceError::ProviderError(format!(
                "Snapshots are stored per {}, requested per {}",
                self.bucket, bucket
            )));
        }
        Ok(self
            .snapshots
            .range(..=as_of)
            .next_back()
            .map(|(_, series)| series.within(range))
            .unwrap_or_default())
    }
}

/// Model outputs held in memory, keyed by model and metric
#[derive(Debug, Clone)]
pub struct InMemoryForecasts {
    default_model: ModelKind,
    outputs: HashMap<(ModelKind, String), Vec<ForecastPoint>>,
}

impl Default for InMemoryForecasts {
    fn default() -> Self {
        Self {
            default_model: ModelKind::Pickup,
            outputs: HashMap::new(),
        }
    }
}

impl InMemoryForecasts {
    pub fn new(default_model: ModelKind) -> Self {
        Self {
            default_model,
            outputs: HashMap::new(),
        }
    }

    pub fn with_output(mut self, model: ModelKind, metric: &str, points: Vec<ForecastPoint>) -> Self {
        self.outputs.insert((model, metric.to_string()), points);
        self
    }
}

impl ForecastModelProvider for InMemoryForecasts {
    fn fetch(
        &self,
        range: &DateRange,
        metric: &str,
        model: Option<ModelKind>,
    ) -> Result<Vec<ForecastPoint>> {
        let model = model.unwrap_or(self.default_model);
        let points = self
            .outputs
            .get(&(model, metric.to_string()))
            .ok_or_else(|| {
                PaceError::ProviderError(format!("No {} forecast for metric '{}'", model, metric))
            })?;
        Ok(points
            .iter()
            .filter(|p| range.contains(p.date))
            .cloned()
            .collect())
    }
}
