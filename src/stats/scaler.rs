//! # Scalers
//!
//! $$
//! z = \frac{x-\mu}{\sigma}, \qquad y = \frac{x-x_{\min}}{x_{\max}-x_{\min}}(b-a)+a
//! $$
//!
//! Single-feature scalers with an inverse transform, matching the way price
//! forecasts are usually normalized before training.

use anyhow::bail;
use anyhow::Result;
use impl_new_derive::ImplNew;

use crate::traits::InverseTransform;

/// Spreads below this are treated as constant data and scaled by one.
const MIN_SPREAD: f64 = 1e-12;

fn check_fit_input(data: &[f64], name: &str) -> Result<()> {
  if data.is_empty() {
    bail!("cannot fit {name} on empty data");
  }
  if data.iter().any(|x| !x.is_finite()) {
    bail!("cannot fit {name} on non-finite data");
  }
  Ok(())
}

/// Standardizes to zero mean and unit (population) variance.
#[derive(ImplNew, Clone, Debug, PartialEq)]
pub struct StandardScaler {
  /// Mean of the fitted data.
  pub mean: f64,
  /// Population standard deviation of the fitted data.
  pub std: f64,
}

impl StandardScaler {
  pub fn fit(data: &[f64]) -> Result<Self> {
    check_fit_input(data, "StandardScaler")?;

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let var = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

    Ok(Self {
      mean,
      std: var.sqrt(),
    })
  }

  fn scale(&self) -> f64 {
    if self.std.abs() < MIN_SPREAD {
      1.0
    } else {
      self.std
    }
  }

  pub fn transform(&self, values: &[f64]) -> Vec<f64> {
    let scale = self.scale();
    values.iter().map(|x| (x - self.mean) / scale).collect()
  }
}

impl InverseTransform for StandardScaler {
  fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>> {
    let scale = self.scale();
    Ok(values.iter().map(|z| z * scale + self.mean).collect())
  }
}

/// Rescales the fitted range `[data_min, data_max]` onto `[feature_min, feature_max]`.
#[derive(ImplNew, Clone, Debug, PartialEq)]
pub struct MinMaxScaler {
  pub data_min: f64,
  pub data_max: f64,
  pub feature_min: f64,
  pub feature_max: f64,
}

impl MinMaxScaler {
  /// Fit on `data` with the target range `feature_range = (min, max)`.
  pub fn fit(data: &[f64], feature_range: (f64, f64)) -> Result<Self> {
    check_fit_input(data, "MinMaxScaler")?;

    let (feature_min, feature_max) = feature_range;
    if !(feature_min < feature_max) {
      bail!("feature range minimum {feature_min} must be below maximum {feature_max}");
    }

    let data_min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let data_max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(Self {
      data_min,
      data_max,
      feature_min,
      feature_max,
    })
  }

  fn data_range(&self) -> f64 {
    let range = self.data_max - self.data_min;
    if range.abs() < MIN_SPREAD {
      1.0
    } else {
      range
    }
  }

  pub fn transform(&self, values: &[f64]) -> Vec<f64> {
    let ratio = (self.feature_max - self.feature_min) / self.data_range();
    values
      .iter()
      .map(|x| (x - self.data_min) * ratio + self.feature_min)
      .collect()
  }
}

impl InverseTransform for MinMaxScaler {
  fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>> {
    let feature_span = self.feature_max - self.feature_min;
    if feature_span.abs() < MIN_SPREAD {
      bail!("MinMaxScaler has a degenerate feature range");
    }

    let ratio = self.data_range() / feature_span;
    Ok(
      values
        .iter()
        .map(|y| (y - self.feature_min) * ratio + self.data_min)
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn standard_scaler_round_trips() {
    let prices = vec![10.0, 12.0, 11.5, 13.0, 12.25];
    let scaler = StandardScaler::fit(&prices).unwrap();
    let scaled = scaler.transform(&prices);

    let mean = scaled.iter().sum::<f64>() / scaled.len() as f64;
    assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);

    let restored = scaler.inverse_transform(&scaled).unwrap();
    for (a, b) in prices.iter().zip(restored.iter()) {
      assert_abs_diff_eq!(a, b, epsilon = 1e-12);
    }
  }

  #[test]
  fn standard_scaler_constant_data_uses_unit_scale() {
    let scaler = StandardScaler::fit(&[5.0, 5.0, 5.0]).unwrap();
    assert_eq!(scaler.transform(&[6.0]), vec![1.0]);
    assert_eq!(scaler.inverse_transform(&[1.0]).unwrap(), vec![6.0]);
  }

  #[test]
  fn min_max_scaler_maps_onto_feature_range() {
    let prices = vec![20.0, 30.0, 25.0, 40.0];
    let scaler = MinMaxScaler::fit(&prices, (0.0, 1.0)).unwrap();

    let scaled = scaler.transform(&prices);
    assert_abs_diff_eq!(scaled[0], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(scaled[3], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(scaled[2], 0.25, epsilon = 1e-12);

    let restored = scaler.inverse_transform(&[0.5]).unwrap();
    assert_abs_diff_eq!(restored[0], 30.0, epsilon = 1e-12);
  }

  #[test]
  fn fit_rejects_bad_input() {
    assert!(StandardScaler::fit(&[]).is_err());
    assert!(MinMaxScaler::fit(&[1.0, f64::NAN], (0.0, 1.0)).is_err());
    assert!(MinMaxScaler::fit(&[1.0, 2.0], (1.0, 1.0)).is_err());
  }

  #[test]
  fn degenerate_feature_range_fails_inverse() {
    let scaler = MinMaxScaler::new(0.0, 1.0, 0.5, 0.5);
    assert!(scaler.inverse_transform(&[0.5]).is_err());
  }
}
