//! # Portfolio Errors
//!
//! Every failure of the engine is a value: callers decide whether to show a
//! message, keep their previous state or retry with a different universe.

use thiserror::Error;

/// Reasons a portfolio computation produced no result.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
  /// Not enough assets or observations to estimate moments.
  #[error("insufficient data: need at least {required} {what}, got {actual}")]
  InsufficientData {
    what: &'static str,
    required: usize,
    actual: usize,
  },

  /// Pivot magnitude fell below the solver tolerance.
  #[error("singular system at column {column}: pivot {pivot:e} below tolerance {tolerance:e}")]
  Singular {
    column: usize,
    pivot: f64,
    tolerance: f64,
  },

  /// Vector or matrix shapes do not agree.
  #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
  DimensionMismatch {
    context: &'static str,
    expected: usize,
    actual: usize,
  },

  /// Unnormalized weights sum to (almost) zero.
  #[error("weights sum to {sum:e}, cannot normalize")]
  DegenerateWeights { sum: f64 },

  /// Symbol not present in the optimized universe.
  #[error("unknown symbol {0}")]
  UnknownSymbol(String),

  /// A weight is more negative than the policy allows.
  #[error("weight {weight:.4} of asset {index} is below tolerance {tolerance}")]
  NegativeWeight {
    index: usize,
    weight: f64,
    tolerance: f64,
  },
}

impl PortfolioError {
  /// `true` for ill-conditioned inputs (collinear assets, too few observations).
  pub fn is_singular(&self) -> bool {
    matches!(self, Self::Singular { .. })
  }
}

pub type Result<T> = std::result::Result<T, PortfolioError>;
