//! # Portfolio Engine
//!
//! $$
//! (p_{i,t}) \mapsto (\mu,\Sigma) \mapsto \mathbf{w}^\* = \operatorname{Optimize}(\mu, \Sigma)
//! $$
//!
//! High-level orchestration API tying risk metrics, optimization, frontier
//! sampling and reporting to one shared configuration.

use rand::Rng;

use super::monte_carlo::MonteCarloSimulator;
use super::optimizers::MeanVarianceOptimizer;
use super::risk::ReturnsRiskCalculator;
use super::summary::PortfolioSummary;
use super::types::FrontierReport;
use super::types::OptimizationOutcome;
use super::types::OptimizationResult;
use super::types::RiskMetrics;
use super::universe::AssetUniverse;
use crate::error::Result;
use crate::quant::WEEKLY_RISK_FREE_RATE;
use crate::traits::InverseTransform;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug)]
pub struct PortfolioEngineConfig {
  /// Periodic risk-free rate shared by every Sharpe/Sortino computation.
  pub risk_free_rate: f64,
  /// Per-asset weight cap for the optimizer and the simulator's raw draws.
  pub max_weight: f64,
  /// L2 concentration penalty of the optimizer.
  pub alpha: f64,
  /// Monte Carlo trial count.
  pub num_simulations: usize,
  /// Optimizer iteration cap.
  pub max_iters: usize,
  /// Optimizer convergence tolerance.
  pub tolerance: f64,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      risk_free_rate: WEEKLY_RISK_FREE_RATE,
      max_weight: 0.4,
      alpha: 0.1,
      num_simulations: 50_000,
      max_iters: 1000,
      tolerance: 1e-9,
    }
  }
}

/// Single entry-point engine for portfolio workflows.
#[derive(Clone, Debug)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl Default for PortfolioEngine {
  fn default() -> Self {
    Self::new(PortfolioEngineConfig::default())
  }
}

impl PortfolioEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  pub fn risk_calculator(&self) -> ReturnsRiskCalculator {
    ReturnsRiskCalculator::new(self.config.risk_free_rate)
  }

  pub fn optimizer(&self) -> MeanVarianceOptimizer {
    MeanVarianceOptimizer::from_config(&self.config)
  }

  pub fn simulator(&self) -> MonteCarloSimulator {
    MonteCarloSimulator::from_config(&self.config)
  }

  /// Risk metrics for each (possibly scaled) price series.
  pub fn asset_metrics(
    &self,
    series: &[Vec<f64>],
    scaler: Option<&dyn InverseTransform>,
  ) -> Result<Vec<RiskMetrics>> {
    self.risk_calculator().compute_metrics_batch(series, scaler)
  }

  /// Estimate expected returns and covariance from raw price series.
  pub fn estimate_universe(&self, series: &[Vec<f64>]) -> Result<AssetUniverse> {
    AssetUniverse::from_price_series(series)
  }

  pub fn optimize(&self, universe: &AssetUniverse) -> Result<OptimizationOutcome> {
    self.optimizer().optimize(universe)
  }

  pub fn simulate<R: Rng + ?Sized>(
    &self,
    universe: &AssetUniverse,
    rng: &mut R,
  ) -> Result<FrontierReport> {
    self.simulator().simulate(universe, rng)
  }

  pub fn summarize<S: AsRef<str>>(
    &self,
    symbols: &[S],
    asset_metrics: &[RiskMetrics],
    allocation: &OptimizationResult,
  ) -> Result<PortfolioSummary> {
    PortfolioSummary::build(symbols, asset_metrics, allocation)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  use super::*;
  use crate::error::PortfolioError;
  use crate::stats::scaler::MinMaxScaler;

  fn price_series() -> Vec<Vec<f64>> {
    vec![
      vec![100.0, 101.0, 103.0, 102.0, 105.0, 107.0, 106.0, 109.0],
      vec![50.0, 50.5, 50.2, 50.9, 51.1, 51.0, 51.6, 51.8],
      vec![20.0, 19.5, 20.4, 21.0, 20.1, 21.3, 21.9, 21.2],
      vec![80.0, 79.0, 78.5, 79.2, 78.0, 77.5, 77.9, 77.0],
    ]
  }

  #[test]
  fn default_config_matches_weekly_setup() {
    let config = PortfolioEngineConfig::default();
    assert_eq!(config.risk_free_rate, 0.02 / 52.0);
    assert_eq!(config.max_weight, 0.4);
    assert_eq!(config.alpha, 0.1);
    assert_eq!(config.num_simulations, 50_000);

    let engine = PortfolioEngine::default();
    assert_eq!(engine.optimizer().max_iters, 1000);
    assert_eq!(engine.simulator().num_simulations, 50_000);
  }

  #[test]
  fn engine_runs_full_pipeline() {
    let engine = PortfolioEngine::new(PortfolioEngineConfig {
      num_simulations: 2_000,
      ..Default::default()
    });
    let series = price_series();

    let metrics = engine.asset_metrics(&series, None).unwrap();
    assert_eq!(metrics.len(), 4);

    let universe = engine.estimate_universe(&series).unwrap();
    let outcome = engine.optimize(&universe).unwrap();
    assert!(outcome.is_converged());

    let weights = &outcome.result.weights;
    assert_abs_diff_eq!(weights.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    assert!(weights.iter().all(|&w| (0.0..=0.4 + 1e-9).contains(&w)));

    let frontier = engine
      .simulate(&universe, &mut StdRng::seed_from_u64(11))
      .unwrap();
    assert_eq!(frontier.samples.len(), 2_000);

    let summary = engine
      .summarize(&["AAA", "BBB", "CCC", "DDD"], &metrics, &outcome.result)
      .unwrap();
    assert_eq!(summary.rows.len(), 4);
    assert!(summary.rows.windows(2).all(|w| w[0].weight >= w[1].weight));
    assert_eq!(summary.total.sharpe, outcome.result.sharpe);
  }

  #[test]
  fn optimizer_is_at_least_as_good_as_sampling() {
    let engine = PortfolioEngine::new(PortfolioEngineConfig {
      risk_free_rate: 0.0,
      max_weight: 1.0,
      alpha: 0.0,
      num_simulations: 5_000,
      ..Default::default()
    });
    let universe = engine.estimate_universe(&price_series()).unwrap();

    let optimal = engine.optimize(&universe).unwrap().into_result();
    let frontier = engine
      .simulate(&universe, &mut StdRng::seed_from_u64(5))
      .unwrap();

    assert!(optimal.sharpe >= frontier.max_sharpe.sharpe - 1e-9);
  }

  #[test]
  fn scaled_predictions_match_raw_prices() {
    let engine = PortfolioEngine::default();
    let raw = price_series();
    let flat: Vec<f64> = raw.iter().flatten().copied().collect();
    let scaler = MinMaxScaler::fit(&flat, (0.0, 1.0)).unwrap();
    let scaled: Vec<Vec<f64>> = raw.iter().map(|s| scaler.transform(s)).collect();

    let from_scaled = engine.asset_metrics(&scaled, Some(&scaler)).unwrap();
    let from_raw = engine.asset_metrics(&raw, None).unwrap();
    for (a, b) in from_scaled.iter().zip(from_raw.iter()) {
      assert_abs_diff_eq!(a.expected_return, b.expected_return, epsilon = 1e-9);
      assert_abs_diff_eq!(a.risk, b.risk, epsilon = 1e-9);
    }
  }

  #[test]
  fn infeasible_cap_is_reported() {
    let engine = PortfolioEngine::new(PortfolioEngineConfig {
      max_weight: 0.2,
      ..Default::default()
    });
    let universe = engine.estimate_universe(&price_series()).unwrap();

    assert!(matches!(
      engine.optimize(&universe),
      Err(PortfolioError::InvalidWeightBounds { .. })
    ));
  }
}
