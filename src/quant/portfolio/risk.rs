//! # Returns & Risk
//!
//! $$
//! \mathrm{Sortino}=\frac{\bar r-r_f}{\sigma_-},\qquad
//! \mathrm{MDD}=\min_t\left(\frac{C_t}{\max_{s\le t} C_s}-1\right),\quad C_t=\prod_{s\le t}(1+r_s)
//! $$
//!
//! Risk/return profile of a single (possibly scaled) price-prediction series.

use std::borrow::Cow;

use impl_new_derive::ImplNew;
use ndarray::Array1;

use super::data::simple_returns_series;
use super::types::RiskMetrics;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::quant::WEEKLY_RISK_FREE_RATE;
use crate::traits::InverseTransform;

/// Population standard deviation, `0` for empty input.
fn population_std(xs: &Array1<f64>) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.std(0.0)
  }
}

fn max_drawdown(returns: &Array1<f64>) -> f64 {
  let mut cumulative = 1.0;
  let mut running_max = f64::NEG_INFINITY;
  let mut worst = 0.0_f64;

  for r in returns.iter() {
    cumulative *= 1.0 + r;
    running_max = running_max.max(cumulative);
    if running_max > 0.0 {
      worst = worst.min(cumulative / running_max - 1.0);
    }
  }

  worst
}

/// Derives [`RiskMetrics`] from price series.
#[derive(ImplNew, Clone, Copy, Debug)]
pub struct ReturnsRiskCalculator {
  /// Periodic risk-free rate used by the Sharpe and Sortino ratios.
  pub risk_free_rate: f64,
}

impl Default for ReturnsRiskCalculator {
  fn default() -> Self {
    Self {
      risk_free_rate: WEEKLY_RISK_FREE_RATE,
    }
  }
}

impl ReturnsRiskCalculator {
  /// Compute the risk profile of `prices`.
  ///
  /// When a scaler is supplied the series is first mapped back to price
  /// units; otherwise it is taken as-is.
  pub fn compute_metrics(
    &self,
    prices: &[f64],
    scaler: Option<&dyn InverseTransform>,
  ) -> Result<RiskMetrics> {
    if prices.len() < 2 {
      return Err(PortfolioError::InsufficientData {
        required: 2,
        actual: prices.len(),
      });
    }

    let prices: Cow<'_, [f64]> = match scaler {
      Some(scaler) => {
        let original = scaler.inverse_transform(prices)?;
        if original.len() != prices.len() {
          return Err(PortfolioError::dimension_mismatch(
            "inverse-transformed prices",
            prices.len(),
            original.len(),
          ));
        }
        Cow::Owned(original)
      }
      None => Cow::Borrowed(prices),
    };

    let returns = Array1::from(simple_returns_series(&prices)?);
    Ok(self.metrics_from_returns(&returns))
  }

  /// Percentage-change series of `prices`.
  pub fn simple_returns(&self, prices: &[f64]) -> Result<Vec<f64>> {
    simple_returns_series(prices)
  }

  /// [`ReturnsRiskCalculator::compute_metrics`] over several assets sharing one scaler.
  pub fn compute_metrics_batch(
    &self,
    series: &[Vec<f64>],
    scaler: Option<&dyn InverseTransform>,
  ) -> Result<Vec<RiskMetrics>> {
    series
      .iter()
      .map(|prices| self.compute_metrics(prices, scaler))
      .collect()
  }

  fn metrics_from_returns(&self, returns: &Array1<f64>) -> RiskMetrics {
    let expected_return = returns.mean().unwrap_or(0.0);
    let risk = population_std(returns);
    let excess = expected_return - self.risk_free_rate;

    let sharpe_ratio = if risk != 0.0 { excess / risk } else { 0.0 };

    let downside: Array1<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_risk = population_std(&downside);
    let sortino_ratio = if downside_risk > 0.0 {
      excess / downside_risk
    } else {
      0.0
    };

    RiskMetrics {
      expected_return,
      risk,
      sharpe_ratio,
      sortino_ratio,
      max_drawdown: max_drawdown(returns),
    }
  }
}
