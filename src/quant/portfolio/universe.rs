//! # Asset Universe
//!
//! $$
//! \Sigma=\Sigma^\top,\qquad \lambda_{\min}(\Sigma)\ge 0
//! $$
//!
//! Validated expected-return vector and covariance matrix consumed by the
//! optimizer and the Monte Carlo simulator.

use nalgebra::DMatrix;

use super::data::align_return_series;
use super::data::sample_covariance_matrix;
use super::data::simple_returns_series;
use crate::error::PortfolioError;
use crate::error::Result;

const SYMMETRY_TOL: f64 = 1e-10;

/// `N` assets described by expected returns and an `N×N` covariance matrix.
///
/// Construction validates shape, finiteness, symmetry and the sign of the
/// diagonal, so downstream numerics never re-check dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetUniverse {
  expected_returns: Vec<f64>,
  cov_matrix: Vec<Vec<f64>>,
}

impl AssetUniverse {
  pub fn new(expected_returns: Vec<f64>, cov_matrix: Vec<Vec<f64>>) -> Result<Self> {
    let n = expected_returns.len();
    if n == 0 {
      return Err(PortfolioError::invalid_parameter("asset universe is empty"));
    }
    if let Some(i) = expected_returns.iter().position(|r| !r.is_finite()) {
      return Err(PortfolioError::invalid_parameter(format!(
        "expected return of asset {i} is not finite"
      )));
    }

    if cov_matrix.len() != n {
      return Err(PortfolioError::dimension_mismatch(
        "covariance rows",
        n,
        cov_matrix.len(),
      ));
    }
    for row in &cov_matrix {
      if row.len() != n {
        return Err(PortfolioError::dimension_mismatch(
          "covariance columns",
          n,
          row.len(),
        ));
      }
      if row.iter().any(|c| !c.is_finite()) {
        return Err(PortfolioError::InvalidCovariance(
          "entries must be finite".to_string(),
        ));
      }
    }

    for i in 0..n {
      if cov_matrix[i][i] < 0.0 {
        return Err(PortfolioError::InvalidCovariance(format!(
          "negative variance {} for asset {i}",
          cov_matrix[i][i]
        )));
      }
      for j in (i + 1)..n {
        let (a, b) = (cov_matrix[i][j], cov_matrix[j][i]);
        if (a - b).abs() > SYMMETRY_TOL * (1.0 + a.abs().max(b.abs())) {
          return Err(PortfolioError::InvalidCovariance(format!(
            "not symmetric at ({i}, {j}): {a} vs {b}"
          )));
        }
      }
    }

    Ok(Self {
      expected_returns,
      cov_matrix,
    })
  }

  /// Like [`AssetUniverse::new`], additionally rejecting matrices with a
  /// materially negative eigenvalue.
  pub fn new_checked(expected_returns: Vec<f64>, cov_matrix: Vec<Vec<f64>>) -> Result<Self> {
    let universe = Self::new(expected_returns, cov_matrix)?;
    universe.ensure_positive_semidefinite(SYMMETRY_TOL)?;
    Ok(universe)
  }

  /// Estimate the universe from per-asset price series.
  ///
  /// Expected returns are mean simple returns; the covariance is the sample
  /// covariance (ddof 1) over the common tail of the return series.
  pub fn from_price_series(series: &[Vec<f64>]) -> Result<Self> {
    let returns = series
      .iter()
      .map(|prices| simple_returns_series(prices))
      .collect::<Result<Vec<_>>>()?;
    Self::from_return_series(&returns)
  }

  pub fn from_return_series(returns: &[Vec<f64>]) -> Result<Self> {
    if returns.is_empty() {
      return Err(PortfolioError::invalid_parameter("asset universe is empty"));
    }

    let aligned = align_return_series(returns);
    let periods = aligned.first().map(|r| r.len()).unwrap_or(0);
    if periods < 2 {
      return Err(PortfolioError::InsufficientData {
        required: 2,
        actual: periods,
      });
    }

    let expected_returns = aligned
      .iter()
      .map(|r| r.iter().sum::<f64>() / r.len() as f64)
      .collect();
    let cov_matrix = sample_covariance_matrix(&aligned);

    Self::new(expected_returns, cov_matrix)
  }

  pub fn n_assets(&self) -> usize {
    self.expected_returns.len()
  }

  pub fn expected_returns(&self) -> &[f64] {
    &self.expected_returns
  }

  pub fn cov_matrix(&self) -> &[Vec<f64>] {
    &self.cov_matrix
  }

  /// Smallest eigenvalue of the covariance matrix.
  pub fn min_eigenvalue(&self) -> f64 {
    let n = self.n_assets();
    DMatrix::from_fn(n, n, |i, j| self.cov_matrix[i][j])
      .symmetric_eigenvalues()
      .min()
  }

  /// Fails when the smallest eigenvalue is below `-tol` relative to the
  /// largest diagonal entry.
  pub fn ensure_positive_semidefinite(&self, tol: f64) -> Result<()> {
    let scale = (0..self.n_assets())
      .map(|i| self.cov_matrix[i][i])
      .fold(1.0_f64, f64::max);
    let min_eig = self.min_eigenvalue();

    if min_eig < -tol * scale {
      return Err(PortfolioError::InvalidCovariance(format!(
        "not positive semidefinite (min eigenvalue {min_eig})"
      )));
    }
    Ok(())
  }
}
