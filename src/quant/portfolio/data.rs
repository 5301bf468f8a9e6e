//! # Portfolio Data Utilities
//!
//! $$
//! r_t = \frac{p_{t+1}-p_t}{p_t},\qquad
//! \hat\Sigma_{ij} = \frac{1}{T-1}\sum_t (r_{i,t}-\bar r_i)(r_{j,t}-\bar r_j)
//! $$
//!
//! Helpers for return preprocessing and correlation/covariance construction.

use super::metrics::dot;
use crate::error::PortfolioError;
use crate::error::Result;

fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
  let n = x.len().min(y.len());
  if n < 2 {
    return 0.0;
  }

  let mx = sample_mean(&x[..n]);
  let my = sample_mean(&y[..n]);

  let mut cov = 0.0;
  let mut sx = 0.0;
  let mut sy = 0.0;

  for i in 0..n {
    let dx = x[i] - mx;
    let dy = y[i] - my;
    cov += dx * dy;
    sx += dx * dx;
    sy += dy * dy;
  }

  let denom = (sx * sy).sqrt();
  if denom < 1e-15 {
    0.0
  } else {
    (cov / denom).clamp(-1.0, 1.0)
  }
}

/// Percentage-change series of `prices`, one element shorter than its input.
///
/// Fails with `InsufficientData` below two observations and with
/// `InvalidPrice` for non-finite prices or a zero denominator.
pub fn simple_returns_series(prices: &[f64]) -> Result<Vec<f64>> {
  if prices.len() < 2 {
    return Err(PortfolioError::InsufficientData {
      required: 2,
      actual: prices.len(),
    });
  }

  if let Some((index, &value)) = prices.iter().enumerate().find(|(_, p)| !p.is_finite()) {
    return Err(PortfolioError::InvalidPrice { index, value });
  }
  if let Some((index, &value)) = prices[..prices.len() - 1]
    .iter()
    .enumerate()
    .find(|(_, &p)| p == 0.0)
  {
    return Err(PortfolioError::InvalidPrice { index, value });
  }

  Ok(
    prices
      .windows(2)
      .map(|w| (w[1] - w[0]) / w[0])
      .collect(),
  )
}

/// Align multiple return series to common tail length.
pub fn align_return_series(all_returns: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let min_len = all_returns.iter().map(|r| r.len()).min().unwrap_or(0);
  all_returns
    .iter()
    .map(|r| r[r.len().saturating_sub(min_len)..].to_vec())
    .collect()
}

/// Build a Pearson correlation matrix from aligned return series.
pub fn correlation_matrix(aligned_returns: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let n = aligned_returns.len();
  let mut corr = vec![vec![1.0; n]; n];

  for i in 0..n {
    for j in (i + 1)..n {
      let r = pearson(&aligned_returns[i], &aligned_returns[j]);
      corr[i][j] = r;
      corr[j][i] = r;
    }
  }

  corr
}

/// Sample covariance matrix (ddof 1) of aligned return series.
///
/// Series shorter than two periods yield a zero matrix.
pub fn sample_covariance_matrix(aligned_returns: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let n = aligned_returns.len();
  let periods = aligned_returns.iter().map(|r| r.len()).min().unwrap_or(0);
  let mut cov = vec![vec![0.0; n]; n];
  if periods < 2 {
    return cov;
  }

  let centered: Vec<Vec<f64>> = aligned_returns
    .iter()
    .map(|r| {
      let tail = &r[r.len() - periods..];
      let m = sample_mean(tail);
      tail.iter().map(|x| x - m).collect()
    })
    .collect();

  for i in 0..n {
    for j in i..n {
      let c = dot(&centered[i], &centered[j]) / (periods - 1) as f64;
      cov[i][j] = c;
      cov[j][i] = c;
    }
  }

  cov
}

/// Weighted portfolio value `Σ w_i p_{i,t}` over the common tail of the price series.
pub fn portfolio_value_series(prices: &[Vec<f64>], weights: &[f64]) -> Result<Vec<f64>> {
  if prices.len() != weights.len() {
    return Err(PortfolioError::dimension_mismatch(
      "price series",
      weights.len(),
      prices.len(),
    ));
  }

  let aligned = align_return_series(prices);
  let periods = aligned.first().map(|p| p.len()).unwrap_or(0);

  Ok(
    (0..periods)
      .map(|t| {
        aligned
          .iter()
          .zip(weights.iter())
          .map(|(series, w)| w * series[t])
          .sum()
      })
      .collect(),
  )
}

/// Simple returns of the weighted portfolio value series.
pub fn portfolio_value_returns(prices: &[Vec<f64>], weights: &[f64]) -> Result<Vec<f64>> {
  simple_returns_series(&portfolio_value_series(prices, weights)?)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn simple_returns_are_percentage_changes() {
    let r = simple_returns_series(&[100.0, 110.0, 99.0]).unwrap();
    assert_eq!(r.len(), 2);
    assert_abs_diff_eq!(r[0], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(r[1], -0.1, epsilon = 1e-12);
  }

  #[test]
  fn simple_returns_reject_short_and_invalid_series() {
    assert!(matches!(
      simple_returns_series(&[1.0]),
      Err(PortfolioError::InsufficientData {
        required: 2,
        actual: 1
      })
    ));
    assert!(matches!(
      simple_returns_series(&[1.0, 0.0, 2.0]),
      Err(PortfolioError::InvalidPrice { index: 1, .. })
    ));
    assert!(matches!(
      simple_returns_series(&[1.0, f64::NAN]),
      Err(PortfolioError::InvalidPrice { index: 1, .. })
    ));
    // A zero last price is a valid total loss.
    assert!(simple_returns_series(&[1.0, 0.0]).is_ok());
  }

  #[test]
  fn align_keeps_common_tail() {
    let aligned = align_return_series(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]);
    assert_eq!(aligned, vec![vec![2.0, 3.0], vec![4.0, 5.0]]);
  }

  #[test]
  fn correlation_of_perfectly_related_series() {
    let a = vec![0.01, -0.02, 0.03, 0.00];
    let b: Vec<f64> = a.iter().map(|x| -2.0 * x).collect();
    let corr = correlation_matrix(&[a, b]);

    assert_eq!(corr[0][0], 1.0);
    assert_abs_diff_eq!(corr[0][1], -1.0, epsilon = 1e-12);
    assert_eq!(corr[0][1], corr[1][0]);
  }

  #[test]
  fn covariance_diagonal_is_sample_variance() {
    let cov = sample_covariance_matrix(&[vec![1.0, 2.0, 3.0, 4.0]]);
    assert_abs_diff_eq!(cov[0][0], 5.0 / 3.0, epsilon = 1e-12);
  }

  #[test]
  fn value_series_weights_prices() {
    let prices = vec![vec![10.0, 11.0, 12.0], vec![20.0, 18.0]];
    let value = portfolio_value_series(&prices, &[0.5, 0.5]).unwrap();
    assert_eq!(value.len(), 2);
    assert_abs_diff_eq!(value[0], 15.5, epsilon = 1e-12);
    assert_abs_diff_eq!(value[1], 15.0, epsilon = 1e-12);

    assert!(portfolio_value_series(&prices, &[1.0]).is_err());

    let returns = portfolio_value_returns(&prices, &[0.5, 0.5]).unwrap();
    assert_eq!(returns.len(), 1);
    assert_abs_diff_eq!(returns[0], -0.5 / 15.5, epsilon = 1e-12);
  }
}
