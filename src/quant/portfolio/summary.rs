//! # Portfolio Summary
//!
//! Per-asset weight, return, risk and Sharpe rows of an optimized allocation,
//! ordered by weight, followed by a total row for the whole portfolio.

use super::types::OptimizationResult;
use super::types::RiskMetrics;
use crate::error::PortfolioError;
use crate::error::Result;

/// Label of the aggregate row.
pub const TOTAL_LABEL: &str = "TOTAL";

#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRow {
  pub symbol: String,
  pub weight: f64,
  pub expected_return: f64,
  pub risk: f64,
  pub sharpe: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortfolioSummary {
  /// Asset rows, heaviest weight first.
  pub rows: Vec<SummaryRow>,
  /// Sum of weights with the portfolio-level return, risk and Sharpe.
  pub total: SummaryRow,
}

impl PortfolioSummary {
  /// Combine per-asset metrics with the optimized allocation.
  ///
  /// `symbols`, `asset_metrics` and `allocation.weights` are index-aligned.
  /// Equal weights keep their input order.
  pub fn build<S: AsRef<str>>(
    symbols: &[S],
    asset_metrics: &[RiskMetrics],
    allocation: &OptimizationResult,
  ) -> Result<Self> {
    let n = allocation.weights.len();
    if symbols.len() != n {
      return Err(PortfolioError::dimension_mismatch("symbols", n, symbols.len()));
    }
    if asset_metrics.len() != n {
      return Err(PortfolioError::dimension_mismatch(
        "asset metrics",
        n,
        asset_metrics.len(),
      ));
    }

    let mut rows: Vec<SummaryRow> = symbols
      .iter()
      .zip(asset_metrics.iter())
      .zip(allocation.weights.iter())
      .map(|((symbol, metrics), &weight)| SummaryRow {
        symbol: symbol.as_ref().to_string(),
        weight,
        expected_return: metrics.expected_return,
        risk: metrics.risk,
        sharpe: metrics.sharpe_ratio,
      })
      .collect();
    rows.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let total = SummaryRow {
      symbol: TOTAL_LABEL.to_string(),
      weight: allocation.weights.iter().sum(),
      expected_return: allocation.expected_return,
      risk: allocation.risk,
      sharpe: allocation.sharpe,
    };

    Ok(Self { rows, total })
  }

  /// Rows whose weight is strictly positive.
  pub fn holdings(&self) -> impl Iterator<Item = &SummaryRow> {
    self.rows.iter().filter(|row| row.weight > 0.0)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  fn metrics(expected_return: f64, risk: f64) -> RiskMetrics {
    RiskMetrics {
      expected_return,
      risk,
      sharpe_ratio: expected_return / risk,
      ..Default::default()
    }
  }

  fn allocation() -> OptimizationResult {
    OptimizationResult {
      weights: vec![0.2, 0.4, 0.0, 0.4],
      expected_return: 0.011,
      risk: 0.015,
      sharpe: 0.7,
    }
  }

  #[test]
  fn rows_are_sorted_by_weight() {
    let summary = PortfolioSummary::build(
      &["AAA", "BBB", "CCC", "DDD"],
      &[
        metrics(0.01, 0.02),
        metrics(0.02, 0.03),
        metrics(0.0, 0.01),
        metrics(0.005, 0.02),
      ],
      &allocation(),
    )
    .unwrap();

    let order: Vec<&str> = summary.rows.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order, vec!["BBB", "DDD", "AAA", "CCC"]);
    assert_eq!(summary.rows[0].expected_return, 0.02);
    assert_eq!(summary.holdings().count(), 3);
  }

  #[test]
  fn total_row_carries_portfolio_metrics() {
    let summary = PortfolioSummary::build(
      &["AAA", "BBB", "CCC", "DDD"],
      &[metrics(0.01, 0.02); 4],
      &allocation(),
    )
    .unwrap();

    assert_eq!(summary.total.symbol, TOTAL_LABEL);
    assert_abs_diff_eq!(summary.total.weight, 1.0, epsilon = 1e-12);
    assert_eq!(summary.total.expected_return, 0.011);
    assert_eq!(summary.total.risk, 0.015);
    assert_eq!(summary.total.sharpe, 0.7);
  }

  #[test]
  fn rejects_misaligned_inputs() {
    let err = PortfolioSummary::build(&["AAA"], &[metrics(0.01, 0.02); 4], &allocation()).unwrap_err();
    assert!(matches!(
      err,
      PortfolioError::DimensionMismatch {
        expected: 4,
        actual: 1,
        ..
      }
    ));

    let err = PortfolioSummary::build(&["A", "B", "C", "D"], &[metrics(0.01, 0.02)], &allocation())
      .unwrap_err();
    assert!(matches!(err, PortfolioError::DimensionMismatch { .. }));
  }
}
