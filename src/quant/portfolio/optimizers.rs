//! # Mean-Variance Optimizer
//!
//! $$
//! \min_{\mathbf{w}}\ -\frac{\mu^\top\mathbf w-r_f}{\sqrt{\mathbf w^\top\Sigma\mathbf w}}+\alpha\lVert\mathbf w\rVert_2^2
//! \quad\text{s.t.}\quad \textstyle\sum_i w_i=1,\ 0\le w_i\le u
//! $$
//!
//! Long-only, capped maximum-Sharpe allocation with an L2 concentration
//! penalty. Solved by spectral projected gradient (Barzilai-Borwein steps with
//! Armijo backtracking) on the capped simplex, starting from uniform weights.
//! The iteration is an argmin [`Solver`] driven by [`Executor`].

use anyhow::anyhow;
use anyhow::bail;
use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::Gradient;
use argmin::core::IterState;
use argmin::core::Problem;
use argmin::core::Solver;
use argmin::core::State;
use argmin::core::TerminationReason;
use argmin::core::TerminationStatus;
use argmin::core::KV;
use tracing::debug;
use tracing::warn;

use super::engine::PortfolioEngineConfig;
use super::metrics::dot;
use super::metrics::evaluate_unchecked;
use super::metrics::mat_vec_mul;
use super::metrics::sharpe_from;
use super::metrics::volatility_unchecked;
use super::simplex::project_capped_simplex;
use super::simplex::project_capped_simplex_on;
use super::types::OptimizationFailure;
use super::types::OptimizationOutcome;
use super::types::SolverStatus;
use super::universe::AssetUniverse;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::quant::WEEKLY_RISK_FREE_RATE;

const BOUNDS_SLACK: f64 = 1e-12;
const MIN_WEIGHT: f64 = 1e-4;
const ARMIJO: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 50;
const MIN_STEP: f64 = 1e-10;
const MAX_STEP: f64 = 1e4;
const STALL_COST: f64 = 1e-15;
const STALL_STEP: f64 = 1e-12;
const STALL_PG: f64 = 1e-6;

type SpgState = IterState<Vec<f64>, Vec<f64>, (), (), (), f64>;

/// Negative penalized Sharpe ratio over the weights.
struct SharpeObjective<'a> {
  mu: &'a [f64],
  cov: &'a [Vec<f64>],
  risk_free_rate: f64,
  alpha: f64,
}

impl CostFunction for SharpeObjective<'_> {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, w: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    let vol = volatility_unchecked(w, self.cov);
    let sharpe = sharpe_from(dot(w, self.mu), vol, self.risk_free_rate);
    let value = -sharpe + self.alpha * dot(w, w);

    if !value.is_finite() {
      bail!("objective is not finite");
    }
    Ok(value)
  }
}

impl Gradient for SharpeObjective<'_> {
  type Param = Vec<f64>;
  type Gradient = Vec<f64>;

  fn gradient(&self, w: &Self::Param) -> std::result::Result<Self::Gradient, argmin::core::Error> {
    let sigma_w = mat_vec_mul(self.cov, w);
    let vol = dot(w, &sigma_w).max(0.0).sqrt();
    let excess = dot(w, self.mu) - self.risk_free_rate;

    let grad: Vec<f64> = (0..w.len())
      .map(|i| {
        // dS/dw = mu / vol - excess * Σw / vol^3, undefined at zero risk
        let d_sharpe = if vol > 0.0 {
          self.mu[i] / vol - excess * sigma_w[i] / vol.powi(3)
        } else {
          0.0
        };
        -d_sharpe + 2.0 * self.alpha * w[i]
      })
      .collect();

    if grad.iter().any(|g| !g.is_finite()) {
      bail!("gradient is not finite");
    }
    Ok(grad)
  }
}

/// `‖P(w - g) - w‖∞`, zero exactly at stationary points.
fn projected_gradient_norm(w: &[f64], g: &[f64], cap: f64) -> f64 {
  let shifted: Vec<f64> = w.iter().zip(g.iter()).map(|(wi, gi)| wi - gi).collect();
  project_capped_simplex(&shifted, cap)
    .iter()
    .zip(w.iter())
    .map(|(p, wi)| (p - wi).abs())
    .fold(0.0, f64::max)
}

fn state_projected_gradient(state: &SpgState, cap: f64) -> f64 {
  match (state.get_param(), state.get_gradient()) {
    (Some(w), Some(g)) => projected_gradient_norm(w, g, cap),
    _ => f64::INFINITY,
  }
}

/// Spectral projected gradient over `{w : Σw = 1, 0 <= w <= cap}`.
///
/// Iterates stay feasible. Converged once the projected gradient is within
/// `tolerance`, or once the objective has stalled close to stationarity.
struct SpectralProjectedGradient {
  cap: f64,
  tolerance: f64,
  /// Barzilai-Borwein step of the next iteration.
  step: f64,
  stalled: bool,
}

impl SpectralProjectedGradient {
  fn new(cap: f64, tolerance: f64) -> Self {
    Self {
      cap,
      tolerance,
      step: 1.0,
      stalled: false,
    }
  }
}

impl<'a> Solver<SharpeObjective<'a>, SpgState> for SpectralProjectedGradient {
  const NAME: &'static str = "Spectral projected gradient";

  fn init(
    &mut self,
    problem: &mut Problem<SharpeObjective<'a>>,
    state: SpgState,
  ) -> std::result::Result<(SpgState, Option<KV>), argmin::core::Error> {
    let w = state
      .get_param()
      .cloned()
      .ok_or_else(|| anyhow!("initial weights are not set"))?;
    let f = problem.cost(&w)?;
    let g = problem.gradient(&w)?;
    Ok((state.cost(f).gradient(g), None))
  }

  fn next_iter(
    &mut self,
    problem: &mut Problem<SharpeObjective<'a>>,
    mut state: SpgState,
  ) -> std::result::Result<(SpgState, Option<KV>), argmin::core::Error> {
    let w = state
      .take_param()
      .ok_or_else(|| anyhow!("weights missing from solver state"))?;
    let g = state
      .take_gradient()
      .ok_or_else(|| anyhow!("gradient missing from solver state"))?;
    let f = state.get_cost();
    let pg = projected_gradient_norm(&w, &g, self.cap);

    let trial: Vec<f64> = w.iter().zip(g.iter()).map(|(wi, gi)| wi - self.step * gi).collect();
    let direction: Vec<f64> = project_capped_simplex(&trial, self.cap)
      .iter()
      .zip(w.iter())
      .map(|(p, wi)| p - wi)
      .collect();
    let slope = dot(&g, &direction);

    // w + λd stays feasible for λ in [0, 1] by convexity
    let mut lambda = 1.0;
    let mut accepted = None;
    for _ in 0..MAX_BACKTRACKS {
      let candidate: Vec<f64> = w
        .iter()
        .zip(direction.iter())
        .map(|(wi, di)| wi + lambda * di)
        .collect();
      let f_candidate = problem.cost(&candidate)?;
      if f_candidate <= f + ARMIJO * lambda * slope {
        accepted = Some((candidate, f_candidate));
        break;
      }
      lambda *= 0.5;
    }

    let Some((w_next, f_next)) = accepted else {
      let reason = if pg <= STALL_PG {
        TerminationReason::SolverConverged
      } else {
        TerminationReason::SolverExit(format!("line search failed (projected gradient {pg:e})"))
      };
      return Ok((state.param(w).gradient(g).terminate_with(reason), None));
    };

    let g_next = problem.gradient(&w_next)?;
    let s: Vec<f64> = w_next.iter().zip(w.iter()).map(|(a, b)| a - b).collect();
    let y: Vec<f64> = g_next.iter().zip(g.iter()).map(|(a, b)| a - b).collect();
    let sty = dot(&s, &y);
    self.step = if sty > 0.0 {
      (dot(&s, &s) / sty).clamp(MIN_STEP, MAX_STEP)
    } else {
      MAX_STEP
    };

    let moved = s.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    self.stalled = (f - f_next).abs() <= STALL_COST && moved <= STALL_STEP;

    Ok((state.param(w_next).cost(f_next).gradient(g_next), None))
  }

  fn terminate(&mut self, state: &SpgState) -> TerminationStatus {
    let pg = state_projected_gradient(state, self.cap);
    if pg <= self.tolerance || (self.stalled && pg <= STALL_PG) {
      TerminationStatus::Terminated(TerminationReason::SolverConverged)
    } else {
      TerminationStatus::NotTerminated
    }
  }
}

/// Maximum-Sharpe allocator with per-asset cap and L2 penalty.
#[derive(Clone, Copy, Debug)]
pub struct MeanVarianceOptimizer {
  /// Periodic risk-free rate.
  pub risk_free_rate: f64,
  /// Upper bound for every weight.
  pub max_weight: f64,
  /// L2 penalty strength, `>= 0`.
  pub alpha: f64,
  pub max_iters: usize,
  /// Projected-gradient infinity norm that counts as converged.
  pub tolerance: f64,
}

impl Default for MeanVarianceOptimizer {
  fn default() -> Self {
    Self {
      risk_free_rate: WEEKLY_RISK_FREE_RATE,
      max_weight: 0.4,
      alpha: 0.1,
      max_iters: 1000,
      tolerance: 1e-9,
    }
  }
}

impl MeanVarianceOptimizer {
  pub fn new(risk_free_rate: f64, max_weight: f64, alpha: f64) -> Self {
    Self {
      risk_free_rate,
      max_weight,
      alpha,
      ..Self::default()
    }
  }

  pub fn from_config(config: &PortfolioEngineConfig) -> Self {
    Self {
      risk_free_rate: config.risk_free_rate,
      max_weight: config.max_weight,
      alpha: config.alpha,
      max_iters: config.max_iters,
      tolerance: config.tolerance,
    }
  }

  pub fn with_max_iters(mut self, max_iters: usize) -> Self {
    self.max_iters = max_iters;
    self
  }

  pub fn with_tolerance(mut self, tolerance: f64) -> Self {
    self.tolerance = tolerance;
    self
  }

  /// Solve for the capped maximum-Sharpe weights of `universe`.
  ///
  /// Infeasible bounds and a bad penalty are errors. A solver that does not
  /// converge is not: the outcome then carries uniform weights and a
  /// [`SolverStatus::Failed`] status.
  pub fn optimize(&self, universe: &AssetUniverse) -> Result<OptimizationOutcome> {
    let n = universe.n_assets();
    if !(n as f64 * self.max_weight + BOUNDS_SLACK >= 1.0) {
      return Err(PortfolioError::InvalidWeightBounds {
        n_assets: n,
        max_weight: self.max_weight,
      });
    }
    if !self.alpha.is_finite() || self.alpha < 0.0 {
      return Err(PortfolioError::invalid_parameter(format!(
        "alpha must be finite and non-negative, got {}",
        self.alpha
      )));
    }

    let problem = SharpeObjective {
      mu: universe.expected_returns(),
      cov: universe.cov_matrix(),
      risk_free_rate: self.risk_free_rate,
      alpha: self.alpha,
    };

    let outcome = match self.solve(problem, n) {
      Ok((raw, iterations)) => {
        debug!(n_assets = n, iterations, "mean-variance optimizer converged");
        OptimizationOutcome {
          result: evaluate_unchecked(universe, self.clean_weights(raw), self.risk_free_rate),
          status: SolverStatus::Converged { iterations },
        }
      }
      Err(failure) => {
        warn!(
          reason = %failure.reason,
          iterations = failure.iterations,
          "mean-variance optimizer did not converge, falling back to uniform weights"
        );
        OptimizationOutcome {
          result: evaluate_unchecked(universe, vec![1.0 / n as f64; n], self.risk_free_rate),
          status: SolverStatus::Failed(failure),
        }
      }
    };

    Ok(outcome)
  }

  fn solve(
    &self,
    problem: SharpeObjective<'_>,
    n: usize,
  ) -> std::result::Result<(Vec<f64>, usize), OptimizationFailure> {
    let fail = |reason: String, iterations: usize| OptimizationFailure { reason, iterations };

    let solver = SpectralProjectedGradient::new(self.max_weight, self.tolerance);
    let res = Executor::new(problem, solver)
      .configure(|state| {
        state
          .param(vec![1.0 / n as f64; n])
          .max_iters(self.max_iters as u64)
      })
      .run()
      .map_err(|e| fail(e.to_string(), 0))?;

    let mut state = res.state;
    let iterations = state.get_iter() as usize;
    match state.get_termination_reason().cloned() {
      Some(TerminationReason::SolverConverged) => state
        .take_param()
        .map(|w| (w, iterations))
        .ok_or_else(|| fail("solver returned no weights".to_string(), iterations)),
      Some(TerminationReason::MaxItersReached) => {
        let pg = state_projected_gradient(&state, self.max_weight);
        Err(fail(
          format!(
            "iteration limit {} reached (projected gradient {pg:e})",
            self.max_iters
          ),
          iterations,
        ))
      }
      Some(reason) => Err(fail(reason.text().to_string(), iterations)),
      None => Err(fail("solver stopped without a reason".to_string(), iterations)),
    }
  }

  /// Drop dust weights and renormalize without breaking the cap.
  fn clean_weights(&self, raw: Vec<f64>) -> Vec<f64> {
    let n = raw.len();
    let mut w: Vec<f64> = raw
      .iter()
      .map(|&x| if x < MIN_WEIGHT { 0.0 } else { x })
      .collect();

    let total: f64 = w.iter().sum();
    if total <= 0.0 {
      return vec![1.0 / n as f64; n];
    }
    w.iter_mut().for_each(|x| *x /= total);

    if w.iter().any(|&x| x > self.max_weight + BOUNDS_SLACK) {
      let support: Vec<bool> = w.iter().map(|&x| x > 0.0).collect();
      return project_capped_simplex_on(&w, self.max_weight, &support).unwrap_or(raw);
    }

    w
  }
}
