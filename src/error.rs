//! # Errors
//!
//! $$
//! \text{input} \mapsto \text{Ok}(\cdot) \;\vert\; \text{Err}(\text{PortfolioError})
//! $$
//!
//! Structural input errors abort an operation. Numeric degeneracies resolve to
//! sentinel values and solver non-convergence travels alongside the result in
//! [`crate::quant::portfolio::SolverStatus`], so neither appears here.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PortfolioError>;

#[derive(Error, Debug)]
pub enum PortfolioError {
  /// Too few price observations to derive a return series.
  #[error("insufficient data: need at least {required} observations, got {actual}")]
  InsufficientData { required: usize, actual: usize },

  /// Vector/matrix sizes disagree.
  #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
  DimensionMismatch {
    context: &'static str,
    expected: usize,
    actual: usize,
  },

  /// `n_assets * max_weight < 1`, so no weight vector can sum to one.
  #[error("invalid weight bounds: {n_assets} assets capped at {max_weight} cannot sum to 1")]
  InvalidWeightBounds { n_assets: usize, max_weight: f64 },

  /// A price that cannot take part in percentage differencing.
  #[error("invalid price {value} at index {index}")]
  InvalidPrice { index: usize, value: f64 },

  #[error("invalid covariance matrix: {0}")]
  InvalidCovariance(String),

  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// The caller-supplied scaler failed to map values back to price units.
  #[error(transparent)]
  Scaler(#[from] anyhow::Error),
}

impl PortfolioError {
  pub(crate) fn dimension_mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
    Self::DimensionMismatch {
      context,
      expected,
      actual,
    }
  }

  pub(crate) fn invalid_parameter(message: impl Into<String>) -> Self {
    Self::InvalidParameter(message.into())
  }
}
