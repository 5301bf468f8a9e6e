//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Portfolio risk metrics, capped maximum-Sharpe optimization and Monte Carlo
//! efficient frontiers.

pub mod data;
pub mod engine;
pub mod metrics;
pub mod monte_carlo;
pub mod optimizers;
pub mod risk;
mod simplex;
pub mod summary;
pub mod types;
pub mod universe;

pub use data::align_return_series;
pub use data::correlation_matrix;
pub use data::portfolio_value_returns;
pub use data::portfolio_value_series;
pub use data::sample_covariance_matrix;
pub use data::simple_returns_series;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use metrics::evaluate;
pub use metrics::portfolio_return;
pub use metrics::portfolio_sharpe;
pub use metrics::portfolio_volatility;
pub use monte_carlo::MonteCarloSimulator;
pub use optimizers::MeanVarianceOptimizer;
pub use risk::ReturnsRiskCalculator;
pub use summary::PortfolioSummary;
pub use summary::SummaryRow;
pub use types::FrontierPoint;
pub use types::FrontierReport;
pub use types::OptimizationFailure;
pub use types::OptimizationOutcome;
pub use types::OptimizationResult;
pub use types::RiskMetrics;
pub use types::SolverStatus;
pub use universe::AssetUniverse;
