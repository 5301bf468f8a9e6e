//! # portfolio-rs
//!
//! $$
//! \mathbf{w}^\* = \arg\max_{\mathbf{w}\in\Delta_u} \frac{\mu^\top\mathbf w - r_f}{\sqrt{\mathbf w^\top\Sigma\mathbf w}}
//! $$
//!
//! Portfolio analytics over predicted price series: per-asset risk metrics,
//! a capped long-only maximum-Sharpe optimizer and a Monte Carlo
//! approximation of the efficient frontier.
//!
//! The [`quant::portfolio::PortfolioEngine`] facade wires the components to
//! one [`quant::portfolio::PortfolioEngineConfig`]; each component can also
//! be used on its own.

pub mod error;
pub mod quant;
pub mod stats;
pub mod traits;

pub use error::PortfolioError;
pub use error::Result;
