//! # Traits
//!
//! $$
//! T^{-1}: \tilde p_t \mapsto p_t
//! $$
//!
//! Capability contracts consumed by the analytics layer.

use anyhow::Result;

/// Maps values from a transformed (normalized) scale back to original units.
///
/// Forecasting pipelines usually train on scaled prices; the risk calculator
/// needs the series in price units before it can difference it. Implementors
/// must return exactly one output per input.
pub trait InverseTransform {
  fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>>;
}

impl<T: InverseTransform + ?Sized> InverseTransform for &T {
  fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>> {
    (**self).inverse_transform(values)
  }
}

impl<T: InverseTransform + ?Sized> InverseTransform for Box<T> {
  fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>> {
    (**self).inverse_transform(values)
  }
}
