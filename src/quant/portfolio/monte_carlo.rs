//! # Monte Carlo Frontier
//!
//! $$
//! \mathbf w^{(k)}=\frac{\mathbf u^{(k)}}{\mathbf 1^\top\mathbf u^{(k)}},\qquad
//! u^{(k)}_i\sim\mathcal U[0,u_{\max})
//! $$
//!
//! Random long-only portfolios scattered over the risk/return plane. Each
//! trial owns an RNG stream derived from one base seed, so the parallel batch
//! is reproducible from the caller's generator.

use impl_new_derive::ImplNew;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::Uniform;
use rayon::prelude::*;
use tracing::debug;

use super::engine::PortfolioEngineConfig;
use super::metrics::dot;
use super::metrics::evaluate_unchecked;
use super::metrics::sharpe_from;
use super::metrics::volatility_unchecked;
use super::types::FrontierPoint;
use super::types::FrontierReport;
use super::universe::AssetUniverse;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::quant::WEEKLY_RISK_FREE_RATE;

/// SplitMix64 finalizer over `(base, index)`.
fn trial_seed(base: u64, index: u64) -> u64 {
  let mut z = base ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
  z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
  z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
  z ^ (z >> 31)
}

/// Random-portfolio sampler approximating the efficient frontier.
#[derive(ImplNew, Clone, Copy, Debug)]
pub struct MonteCarloSimulator {
  pub risk_free_rate: f64,
  /// Number of random portfolios, `>= 1`.
  pub num_simulations: usize,
  /// Upper end of the raw per-asset draw before normalization.
  pub max_weight: f64,
}

impl Default for MonteCarloSimulator {
  fn default() -> Self {
    Self {
      risk_free_rate: WEEKLY_RISK_FREE_RATE,
      num_simulations: 50_000,
      max_weight: 0.4,
    }
  }
}

impl MonteCarloSimulator {
  pub fn from_config(config: &PortfolioEngineConfig) -> Self {
    Self {
      risk_free_rate: config.risk_free_rate,
      num_simulations: config.num_simulations,
      max_weight: config.max_weight,
    }
  }

  /// Sample `num_simulations` portfolios and report the best-Sharpe and
  /// lowest-volatility ones.
  ///
  /// Draws are normalized but not re-clipped, so a sampled weight may end up
  /// above `max_weight`. Ties resolve to the earliest trial.
  pub fn simulate<R: Rng + ?Sized>(
    &self,
    universe: &AssetUniverse,
    rng: &mut R,
  ) -> Result<FrontierReport> {
    if self.num_simulations == 0 {
      return Err(PortfolioError::invalid_parameter(
        "num_simulations must be at least 1",
      ));
    }
    if !self.max_weight.is_finite() || self.max_weight <= 0.0 {
      return Err(PortfolioError::InvalidWeightBounds {
        n_assets: universe.n_assets(),
        max_weight: self.max_weight,
      });
    }

    let base_seed = rng.random::<u64>();
    let dist = Uniform::new(0.0, self.max_weight).map_err(|_| PortfolioError::InvalidWeightBounds {
      n_assets: universe.n_assets(),
      max_weight: self.max_weight,
    })?;
    let mu = universe.expected_returns();
    let cov = universe.cov_matrix();

    let samples: Vec<FrontierPoint> = (0..self.num_simulations)
      .into_par_iter()
      .map(|i| {
        let w = self.trial_weights(base_seed, i, universe.n_assets(), &dist);
        let expected_return = dot(&w, mu);
        let risk = volatility_unchecked(&w, cov);
        FrontierPoint {
          risk,
          expected_return,
          sharpe: sharpe_from(expected_return, risk, self.risk_free_rate),
        }
      })
      .collect();

    let mut best_sharpe = 0;
    let mut best_vol = 0;
    for (i, p) in samples.iter().enumerate().skip(1) {
      if p.sharpe > samples[best_sharpe].sharpe {
        best_sharpe = i;
      }
      if p.risk < samples[best_vol].risk {
        best_vol = i;
      }
    }

    let n = universe.n_assets();
    let max_sharpe = evaluate_unchecked(
      universe,
      self.trial_weights(base_seed, best_sharpe, n, &dist),
      self.risk_free_rate,
    );
    let min_volatility = evaluate_unchecked(
      universe,
      self.trial_weights(base_seed, best_vol, n, &dist),
      self.risk_free_rate,
    );

    debug!(
      trials = samples.len(),
      max_sharpe = max_sharpe.sharpe,
      min_volatility = min_volatility.risk,
      "monte carlo frontier sampled"
    );

    Ok(FrontierReport {
      max_sharpe,
      min_volatility,
      samples,
    })
  }

  /// Weights of trial `index`; regenerating them reproduces the same draw.
  fn trial_weights(&self, base_seed: u64, index: usize, n: usize, dist: &Uniform<f64>) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(trial_seed(base_seed, index as u64));
    let mut w: Vec<f64> = (0..n).map(|_| dist.sample(&mut rng)).collect();

    let total: f64 = w.iter().sum();
    if total > 0.0 {
      w.iter_mut().for_each(|x| *x /= total);
    } else {
      w.fill(1.0 / n as f64);
    }
    w
  }
}
