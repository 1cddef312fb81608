//! Configuration for the pace computations
//!
//! Every section has defaults, so an empty JSON object is a valid
//! configuration:
//!
//! ```json
//! {
//!   "comparison": { "month_alignment": "day_count" },
//!   "reconcile": { "confidence_level": 0.8, "days_count_policy": "exclude_missing" },
//!   "surface": { "min_lookback_days": 30, "lead_padding": 2, "max_lead_days": 730 }
//! }
//! ```

use crate::comparison::ComparisonConfig;
use crate::error::Result;
use crate::reconcile::ReconcileConfig;
use crate::surface::SurfaceConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaceConfig {
    pub comparison: ComparisonConfig,
    pub reconcile: ReconcileConfig,
    pub surface: SurfaceConfig,
}

impl PaceConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PaceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: PaceConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.reconcile.validate()?;
        self.surface.validate()?;
        Ok(())
    }
}
