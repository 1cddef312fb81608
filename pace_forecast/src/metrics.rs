//! Metrics for evaluating forecast performance against realized values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error metrics over the positions where forecast and actual both exist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Number of paired positions the metrics were computed from
    pub observations: usize,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, over non-zero actuals only
    pub mape: Option<f64>,
    /// Mean of forecast minus actual; positive means over-forecasting
    pub bias: f64,
}

/// Compare two positional series, skipping positions missing on either side
///
/// Series of different length are compared up to the longer one; positions
/// past the shorter one count as missing. `None` when nothing pairs up.
pub fn forecast_accuracy(forecast: &[Option<f64>], actual: &[Option<f64>]) -> Option<ForecastAccuracy> {
    let len = forecast.len().max(actual.len());
    let pairs: Vec<(f64, f64)> = (0..len)
        .filter_map(|i| {
            let f = forecast.get(i).copied().flatten().filter(|v| v.is_finite())?;
            let a = actual.get(i).copied().flatten().filter(|v| v.is_finite())?;
            Some((f, a))
        })
        .collect();

    if pairs.is_empty() {
        return None;
    }

    let n = pairs.len() as f64;
    let errors: Vec<f64> = pairs.iter().map(|(f, a)| f - a).collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let rmse = (errors.iter().map(|e| e.powi(2)).sum::<f64>() / n).sqrt();
    let bias = errors.iter().sum::<f64>() / n;

    let percentage_errors: Vec<f64> = pairs
        .iter()
        .filter(|(_, a)| *a != 0.0)
        .map(|(f, a)| ((f - a) / a).abs() * 100.0)
        .collect();
    let mape = (!percentage_errors.is_empty())
        .then(|| percentage_errors.iter().sum::<f64>() / percentage_errors.len() as f64);

    Some(ForecastAccuracy {
        observations: pairs.len(),
        mae,
        rmse,
        mape,
        bias,
    })
}

impl fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics ({} days):", self.observations)?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        match self.mape {
            Some(mape) => writeln!(f, "  MAPE:  {:.4}%", mape)?,
            None => writeln!(f, "  MAPE:  n/a")?,
        }
        writeln!(f, "  Bias:  {:.4}", self.bias)?;
        Ok(())
    }
}
