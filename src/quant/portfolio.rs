//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Mean-variance portfolio optimization: efficient frontier, tangency and
//! minimum-variance portfolios from historical prices.

pub mod data;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod linalg;
pub mod metrics;
pub mod moments;
pub mod tangency;
pub mod types;
pub mod universe;

pub use data::align_returns;
pub use data::align_returns_by_date;
pub use data::evolution_curves;
pub use data::simple_returns;
pub use data::AlignedReturns;
pub use data::EvolutionCurves;
pub use engine::OptimizationReport;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use error::PortfolioError;
pub use error::Result;
pub use frontier::compute_efficient_frontier;
pub use frontier::efficient_frontier;
pub use frontier::frontier_weights;
pub use frontier::min_variance_weights;
pub use linalg::invert;
pub use linalg::solve_linear_system;
pub use linalg::solve_linear_system_with_tolerance;
pub use metrics::evaluate_portfolio;
pub use metrics::portfolio_sharpe;
pub use metrics::portfolio_stats;
pub use moments::estimate_moments;
pub use moments::estimate_moments_annualized;
pub use moments::Moments;
pub use tangency::apply_weight_policy;
pub use tangency::clip_and_renormalize;
pub use tangency::max_sharpe_weights;
pub use tangency::max_sharpe_weights_long_only;
pub use tangency::optimize_max_sharpe;
pub use types::AlignmentMode;
pub use types::AssetHistory;
pub use types::PortfolioPoint;
pub use types::PortfolioStats;
pub use types::PriceBar;
pub use types::WeightPolicy;
pub use types::DEFAULT_FRONTIER_POINTS;
pub use types::DEFAULT_MAX_ASSETS;
pub use types::DEFAULT_NEGATIVE_TOLERANCE;
pub use types::DEFAULT_RISK_FREE;
pub use types::TRADING_DAYS;
pub use universe::select_universe;
