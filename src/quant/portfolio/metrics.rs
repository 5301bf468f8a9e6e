//! # Portfolio Metrics
//!
//! $$
//! \mu_p=\mathbf w^\top\mu,\qquad \sigma_p=\sqrt{\mathbf w^\top\Sigma\mathbf w},\qquad
//! S=\frac{\mu_p-r_f}{\sigma_p}
//! $$
//!
//! Stateless return, volatility and Sharpe evaluation of a weight vector.

use super::types::OptimizationResult;
use super::universe::AssetUniverse;
use crate::error::PortfolioError;
use crate::error::Result;

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub(crate) fn mat_vec_mul(mat: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
  mat.iter().map(|row| dot(row, v)).collect()
}

pub(crate) fn quadratic_form(weights: &[f64], cov: &[Vec<f64>]) -> f64 {
  dot(weights, &mat_vec_mul(cov, weights))
}

/// `sqrt(max(wᵀΣw, 0))` without dimension checks.
pub(crate) fn volatility_unchecked(weights: &[f64], cov: &[Vec<f64>]) -> f64 {
  quadratic_form(weights, cov).max(0.0).sqrt()
}

pub(crate) fn sharpe_from(expected_return: f64, volatility: f64, risk_free_rate: f64) -> f64 {
  if volatility > 0.0 {
    (expected_return - risk_free_rate) / volatility
  } else {
    0.0
  }
}

fn check_cov_shape(n: usize, cov: &[Vec<f64>]) -> Result<()> {
  if cov.len() != n {
    return Err(PortfolioError::dimension_mismatch(
      "covariance rows",
      n,
      cov.len(),
    ));
  }
  if let Some(row) = cov.iter().find(|row| row.len() != n) {
    return Err(PortfolioError::dimension_mismatch(
      "covariance columns",
      n,
      row.len(),
    ));
  }
  Ok(())
}

/// Expected portfolio return `wᵀμ`.
pub fn portfolio_return(weights: &[f64], expected_returns: &[f64]) -> Result<f64> {
  if weights.len() != expected_returns.len() {
    return Err(PortfolioError::dimension_mismatch(
      "expected returns",
      weights.len(),
      expected_returns.len(),
    ));
  }
  Ok(dot(weights, expected_returns))
}

/// Portfolio volatility `sqrt(wᵀΣw)`.
///
/// A radicand that floating point error pushes slightly below zero is
/// clamped, so the result is never negative.
pub fn portfolio_volatility(weights: &[f64], cov_matrix: &[Vec<f64>]) -> Result<f64> {
  check_cov_shape(weights.len(), cov_matrix)?;
  Ok(volatility_unchecked(weights, cov_matrix))
}

/// Sharpe ratio of the portfolio, exactly `0` when its volatility is zero.
pub fn portfolio_sharpe(
  weights: &[f64],
  expected_returns: &[f64],
  cov_matrix: &[Vec<f64>],
  risk_free_rate: f64,
) -> Result<f64> {
  let ret = portfolio_return(weights, expected_returns)?;
  let vol = portfolio_volatility(weights, cov_matrix)?;
  Ok(sharpe_from(ret, vol, risk_free_rate))
}

pub(crate) fn evaluate_unchecked(
  universe: &AssetUniverse,
  weights: Vec<f64>,
  risk_free_rate: f64,
) -> OptimizationResult {
  let expected_return = dot(&weights, universe.expected_returns());
  let risk = volatility_unchecked(&weights, universe.cov_matrix());
  let sharpe = sharpe_from(expected_return, risk, risk_free_rate);

  OptimizationResult {
    weights,
    expected_return,
    risk,
    sharpe,
  }
}

/// Evaluate `weights` against `universe` into a result record.
pub fn evaluate(
  universe: &AssetUniverse,
  weights: Vec<f64>,
  risk_free_rate: f64,
) -> Result<OptimizationResult> {
  if weights.len() != universe.n_assets() {
    return Err(PortfolioError::dimension_mismatch(
      "weights",
      universe.n_assets(),
      weights.len(),
    ));
  }
  Ok(evaluate_unchecked(universe, weights, risk_free_rate))
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use approx::assert_relative_eq;

  use super::*;

  fn cov3() -> Vec<Vec<f64>> {
    vec![
      vec![0.04, 0.01, 0.0],
      vec![0.01, 0.09, 0.02],
      vec![0.0, 0.02, 0.16],
    ]
  }

  #[test]
  fn return_is_dot_product() {
    let r = portfolio_return(&[0.5, 0.3, 0.2], &[0.1, 0.2, -0.05]).unwrap();
    assert_relative_eq!(r, 0.05 + 0.06 - 0.01, epsilon = 1e-15);
  }

  #[test]
  fn return_rejects_length_mismatch() {
    let err = portfolio_return(&[0.5, 0.5], &[0.1]).unwrap_err();
    assert!(matches!(
      err,
      PortfolioError::DimensionMismatch {
        expected: 2,
        actual: 1,
        ..
      }
    ));
  }

  #[test]
  fn volatility_matches_quadratic_form() {
    let w = [0.2, 0.3, 0.5];
    let var: f64 = 0.04 * 0.04 + 0.09 * 0.09 + 0.16 * 0.25 + 2.0 * (0.01 * 0.06 + 0.02 * 0.15);
    let vol = portfolio_volatility(&w, &cov3()).unwrap();
    assert_relative_eq!(vol, var.sqrt(), epsilon = 1e-12);
  }

  #[test]
  fn volatility_rejects_ragged_covariance() {
    let cov = vec![vec![0.04, 0.0], vec![0.0]];
    let err = portfolio_volatility(&[0.5, 0.5], &cov).unwrap_err();
    assert!(matches!(err, PortfolioError::DimensionMismatch { .. }));

    let err = portfolio_volatility(&[1.0], &cov).unwrap_err();
    assert!(matches!(err, PortfolioError::DimensionMismatch { .. }));
  }

  #[test]
  fn volatility_is_never_negative() {
    // Rank-one PSD matrix; w lies in its null space.
    let cov = vec![vec![1.0, -1.0], vec![-1.0, 1.0]];
    let vol = portfolio_volatility(&[0.5, 0.5], &cov).unwrap();
    assert!(vol >= 0.0);
    assert_abs_diff_eq!(vol, 0.0, epsilon = 1e-12);
  }

  #[test]
  fn sharpe_is_zero_for_riskless_portfolio() {
    let cov = vec![vec![0.0, 0.0], vec![0.0, 0.0]];
    let s = portfolio_sharpe(&[0.5, 0.5], &[0.05, 0.07], &cov, 0.01).unwrap();
    assert_eq!(s, 0.0);
  }

  #[test]
  fn sharpe_uses_excess_return() {
    let cov = vec![vec![0.04]];
    let s = portfolio_sharpe(&[1.0], &[0.1], &cov, 0.02).unwrap();
    assert_relative_eq!(s, 0.4, epsilon = 1e-12);
  }
}
