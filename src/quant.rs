//! # Quant
//!
//! $$
//! r_f^{(w)} = \frac{r_f^{(a)}}{52}
//! $$
//!
//! Portfolio analytics and construction.

pub mod portfolio;

/// Annual risk-free rate assumed by every default in this crate.
pub const ANNUAL_RISK_FREE_RATE: f64 = 0.02;

/// Observation periods per year for the weekly series the engine is fed.
pub const PERIODS_PER_YEAR: f64 = 52.0;

/// Annual 2% converted to weekly periodicity, shared by the risk calculator,
/// the optimizer and the Monte Carlo simulator.
pub const WEEKLY_RISK_FREE_RATE: f64 = ANNUAL_RISK_FREE_RATE / PERIODS_PER_YEAR;
