//! # Portfolio Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}} \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Result records shared by the risk calculator, the optimizer and the
//! Monte Carlo simulator.

/// Risk/return profile of a single price series.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RiskMetrics {
  /// Mean periodic simple return.
  pub expected_return: f64,
  /// Population standard deviation of the returns (`>= 0`).
  pub risk: f64,
  /// `(expected_return - r_f) / risk`, `0` when `risk == 0`.
  pub sharpe_ratio: f64,
  /// `(expected_return - r_f) / downside_risk`, `0` when there is no downside dispersion.
  pub sortino_ratio: f64,
  /// Deepest peak-to-trough decline of the compounded returns (`<= 0`).
  pub max_drawdown: f64,
}

/// Weights together with their PortfolioMetrics evaluation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptimizationResult {
  /// Final portfolio weights.
  pub weights: Vec<f64>,
  /// Model expected portfolio return.
  pub expected_return: f64,
  /// Model portfolio volatility.
  pub risk: f64,
  /// Sharpe ratio computed as `(expected_return - risk_free) / risk`.
  pub sharpe: f64,
}

/// Non-fatal signal that the solver did not converge.
///
/// The accompanying result then holds the uniform starting weights.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizationFailure {
  pub reason: String,
  /// Iterations spent before giving up.
  pub iterations: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SolverStatus {
  Converged { iterations: usize },
  Failed(OptimizationFailure),
}

/// What [`crate::quant::portfolio::MeanVarianceOptimizer::optimize`] hands back.
///
/// The result is always usable; `status` tells whether it is the optimum or
/// the uniform fallback.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizationOutcome {
  pub result: OptimizationResult,
  pub status: SolverStatus,
}

impl OptimizationOutcome {
  pub fn is_converged(&self) -> bool {
    matches!(self.status, SolverStatus::Converged { .. })
  }

  pub fn failure(&self) -> Option<&OptimizationFailure> {
    match &self.status {
      SolverStatus::Failed(failure) => Some(failure),
      SolverStatus::Converged { .. } => None,
    }
  }

  pub fn into_result(self) -> OptimizationResult {
    self.result
  }
}

/// One sampled portfolio on the risk/return plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrontierPoint {
  pub risk: f64,
  pub expected_return: f64,
  pub sharpe: f64,
}

/// Monte Carlo approximation of the efficient frontier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrontierReport {
  /// Sampled portfolio with the highest Sharpe ratio.
  pub max_sharpe: OptimizationResult,
  /// Sampled portfolio with the lowest volatility.
  pub min_volatility: OptimizationResult,
  /// Every trial in sampling order.
  pub samples: Vec<FrontierPoint>,
}
