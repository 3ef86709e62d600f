//! # Portfolio Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{\mathbf{w}} \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Shared constants, policies, price payloads and result containers.

use chrono::NaiveDate;
use impl_new_derive::ImplNew;

/// Trading periods per year used to annualize daily moments.
pub const TRADING_DAYS: f64 = 252.0;

/// Annualized risk-free rate used when none is supplied.
pub const DEFAULT_RISK_FREE: f64 = 0.04;

/// Number of frontier sweep intervals (`n_points + 1` targets).
pub const DEFAULT_FRONTIER_POINTS: usize = 50;

/// Upper bound on the number of assets fed to the optimizer.
pub const DEFAULT_MAX_ASSETS: usize = 120;

/// Most negative weight a rejecting policy tolerates before discarding the allocation.
pub const DEFAULT_NEGATIVE_TOLERANCE: f64 = -0.01;

/// Post-processing applied to signed max-Sharpe weights before they are shown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeightPolicy {
  /// Discard the allocation if any weight is below `tolerance`, otherwise clip and renormalize.
  Reject { tolerance: f64 },
  /// Always clip negative weights to zero and renormalize (long-only).
  ClipRenormalize,
}

impl Default for WeightPolicy {
  fn default() -> Self {
    Self::Reject {
      tolerance: DEFAULT_NEGATIVE_TOLERANCE,
    }
  }
}

/// How multi-asset price histories are lined up before returns are taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignmentMode {
  /// Keep the most recent common number of observations, ignoring dates.
  #[default]
  Trailing,
  /// Keep only dates present in every history.
  Calendar,
}

/// One OHLCV observation as delivered by a price-history provider.
#[derive(ImplNew, Clone, Debug, PartialEq)]
pub struct PriceBar {
  pub date: NaiveDate,
  pub open: f64,
  pub high: f64,
  pub low: f64,
  pub close: f64,
  pub volume: f64,
}

/// Date-ordered price history of a single symbol.
#[derive(ImplNew, Clone, Debug, Default, PartialEq)]
pub struct AssetHistory {
  pub symbol: String,
  pub bars: Vec<PriceBar>,
}

impl AssetHistory {
  /// Closing prices in bar order.
  pub fn closes(&self) -> Vec<f64> {
    self.bars.iter().map(|b| b.close).collect()
  }

  /// Number of bars.
  pub fn len(&self) -> usize {
    self.bars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bars.is_empty()
  }
}

/// Risk/return summary of a weight vector.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortfolioStats {
  /// `w' mu`, annualized if the inputs are.
  pub expected_return: f64,
  /// `w' Sigma w`, floored at zero.
  pub variance: f64,
  /// Square root of `variance`.
  pub risk: f64,
  /// `(expected_return - risk_free) / risk`, or zero when `risk` is zero.
  pub sharpe: f64,
}

/// A portfolio on (or near) the efficient frontier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PortfolioPoint {
  pub expected_return: f64,
  /// Standard deviation of the portfolio return.
  pub risk: f64,
  pub sharpe: f64,
  pub weights: Option<Vec<f64>>,
}

impl PortfolioPoint {
  pub fn from_stats(stats: PortfolioStats, weights: Option<Vec<f64>>) -> Self {
    Self {
      expected_return: stats.expected_return,
      risk: stats.risk,
      sharpe: stats.sharpe,
      weights,
    }
  }
}
