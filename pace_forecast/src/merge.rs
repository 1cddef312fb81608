//! Side-by-side merge of several forecast models
//!
//! Every model is requested with the same range, metric and bucket, so rows
//! line up by position. A model that returns fewer rows (for example one
//! that skipped dates lacking history) simply has empty cells at the end.

use crate::error::{PaceError, Result};
use crate::metrics::{forecast_accuracy, ForecastAccuracy};
use crate::reconcile::ForecastPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Forecasting model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Pickup,
    Prophet,
    #[serde(rename = "xgboost")]
    XgBoost,
    Tft,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Pickup,
        ModelKind::Prophet,
        ModelKind::XgBoost,
        ModelKind::Tft,
    ];

    /// Identifier used by forecast providers
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Pickup => "pickup",
            ModelKind::Prophet => "prophet",
            ModelKind::XgBoost => "xgboost",
            ModelKind::Tft => "tft",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = PaceError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        ModelKind::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| PaceError::InvalidParameter(format!("Unknown model: {}", s)))
    }
}

/// Rows returned by one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    pub model: ModelKind,
    pub points: Vec<ForecastPoint>,
}

impl ModelOutput {
    pub fn new(model: ModelKind, points: Vec<ForecastPoint>) -> Self {
        Self { model, points }
    }
}

/// One model's values at one row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MergedCell {
    pub forecast: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

/// A row of the merged table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub index: usize,
    /// Date of the first model that has a row at this position
    pub date: Option<NaiveDate>,
    /// One cell per model, in the order of [`MergedForecastTable::models`]
    pub cells: Vec<MergedCell>,
}

/// Models side by side, one row per position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedForecastTable {
    pub models: Vec<ModelKind>,
    pub rows: Vec<MergedRow>,
}

impl MergedForecastTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn model_index(&self, model: ModelKind) -> Option<usize> {
        self.models.iter().position(|m| *m == model)
    }

    /// Forecast of `model` at `row`
    pub fn forecast(&self, row: usize, model: ModelKind) -> Option<f64> {
        let column = self.model_index(model)?;
        self.rows.get(row)?.cells.get(column)?.forecast
    }

    /// All forecasts of one model, one entry per row
    pub fn model_column(&self, model: ModelKind) -> Vec<Option<f64>> {
        match self.model_index(model) {
            Some(column) => self
                .rows
                .iter()
                .map(|r| r.cells.get(column).and_then(|c| c.forecast))
                .collect(),
            None => vec![None; self.rows.len()],
        }
    }

    /// Per-model error metrics against realized values, positionally
    pub fn accuracy_against(&self, actuals: &[Option<f64>]) -> Vec<(ModelKind, Option<ForecastAccuracy>)> {
        self.models
            .iter()
            .map(|m| (*m, forecast_accuracy(&self.model_column(*m), actuals)))
            .collect()
    }
}

/// Zip model outputs by position into one table
pub fn merge_models(outputs: &[ModelOutput]) -> MergedForecastTable {
    let row_count = outputs.iter().map(|o| o.points.len()).max().unwrap_or(0);

    let rows = (0..row_count)
        .map(|index| {
            let date = outputs
                .iter()
                .find_map(|o| o.points.get(index).map(|p| p.date));
            let cells = outputs
                .iter()
                .map(|o| {
                    o.points
                        .get(index)
                        .map(|p| MergedCell {
                            forecast: p.forecast,
                            lower: p.forecast_lower,
                            upper: p.forecast_upper,
                        })
                        .unwrap_or_default()
                })
                .collect();
            MergedRow { index, date, cells }
        })
        .collect();

    debug!(
        models = outputs.len(),
        rows = row_count,
        "merged model forecasts"
    );

    MergedForecastTable {
        models: outputs.iter().map(|o| o.model).collect(),
        rows,
    }
}
