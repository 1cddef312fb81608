//! # Pace Math
//!
//! Numeric building blocks for booking pace and pickup calculations.
//! Every operation treats a missing operand as "no data" and returns `None`
//! instead of a sentinel, so callers can tell "unknown" apart from zero.

use thiserror::Error;

pub mod aggregate;
pub mod pacing;

pub use aggregate::{DaysCountPolicy, RunningTotal};
pub use pacing::{add, is_ordered_band, percent_change, pickup, present, safe_div};

/// Errors that can occur in pace-related calculations
#[derive(Error, Debug, PartialEq)]
pub enum MathError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for pace math operations
pub type Result<T> = std::result::Result<T, MathError>;
