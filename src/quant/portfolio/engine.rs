//! # Portfolio Engine
//!
//! $$
//! \{p_{i,t}\} \to \{r_{i,t}\} \to (\mu, \Sigma) \to \{\text{frontier}, \mathbf{w}_{\text{tan}}, \mathbf{w}_{\text{gmv}}\}
//! $$
//!
//! High-level orchestration: universe cap, alignment, moment estimation and
//! the three optimizers, driven by one [`PortfolioEngineConfig`].

use tracing::info;
use tracing::warn;

use super::data::align_returns;
use super::data::align_returns_by_date;
use super::error::PortfolioError;
use super::error::Result;
use super::frontier::efficient_frontier;
use super::frontier::min_variance_weights;
use super::metrics::evaluate_portfolio;
use super::moments::estimate_moments_annualized;
use super::moments::Moments;
use super::tangency::optimize_max_sharpe;
use super::types::AlignmentMode;
use super::types::AssetHistory;
use super::types::PortfolioPoint;
use super::types::PortfolioStats;
use super::types::WeightPolicy;
use super::types::DEFAULT_FRONTIER_POINTS;
use super::types::DEFAULT_MAX_ASSETS;
use super::types::DEFAULT_RISK_FREE;
use super::types::TRADING_DAYS;
use super::universe::select_universe;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug)]
pub struct PortfolioEngineConfig {
  /// Annualized risk-free rate used in Sharpe computations and the tangency solve.
  pub risk_free: f64,
  /// Periods per year used to annualize daily moments.
  pub periods_per_year: f64,
  /// Frontier sweep resolution (`frontier_points + 1` targets).
  pub frontier_points: usize,
  /// Hard cap on the optimizable universe.
  pub max_assets: usize,
  /// Post-processing of the tangency weights.
  pub weight_policy: WeightPolicy,
  /// How price histories are lined up.
  pub alignment: AlignmentMode,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      risk_free: DEFAULT_RISK_FREE,
      periods_per_year: TRADING_DAYS,
      frontier_points: DEFAULT_FRONTIER_POINTS,
      max_assets: DEFAULT_MAX_ASSETS,
      weight_policy: WeightPolicy::default(),
      alignment: AlignmentMode::default(),
    }
  }
}

/// Everything computed for one optimization request.
#[derive(Clone, Debug)]
pub struct OptimizationReport {
  /// Symbols of the optimized assets, in the order of `moments`.
  pub symbols: Vec<String>,
  /// Number of aligned return observations per asset.
  pub observations: usize,
  pub moments: Moments,
  /// Efficient frontier sorted ascending by risk.
  pub frontier: Vec<PortfolioPoint>,
  /// Max-Sharpe portfolio after the weight policy, if one exists.
  pub tangency: Option<PortfolioPoint>,
  /// Global minimum-variance portfolio, if one exists.
  pub min_variance: Option<PortfolioPoint>,
}

/// Single entry-point engine for frontier and tangency workflows.
#[derive(Clone, Debug, Default)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
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

  /// Run the full pipeline over caller-supplied price histories.
  ///
  /// Fails only when the data cannot be aligned; a singular tangency or
  /// minimum-variance solve leaves the corresponding field `None`.
  pub fn optimize(&self, histories: &[AssetHistory]) -> Result<OptimizationReport> {
    let lengths: Vec<usize> = histories.iter().map(AssetHistory::len).collect();
    let selected: Vec<&AssetHistory> = select_universe(&lengths, self.config.max_assets)
      .into_iter()
      .map(|i| &histories[i])
      .collect();

    let aligned = match self.config.alignment {
      AlignmentMode::Trailing => {
        let closes: Vec<Vec<f64>> = selected.iter().map(|h| h.closes()).collect();
        align_returns(&closes)?
      }
      AlignmentMode::Calendar => align_returns_by_date(&selected)?,
    };

    let symbols: Vec<String> = aligned
      .asset_indices
      .iter()
      .map(|&i| selected[i].symbol.clone())
      .collect();
    let moments = estimate_moments_annualized(&aligned.returns, self.config.periods_per_year);

    let frontier = efficient_frontier(&moments, self.config.frontier_points, self.config.risk_free);
    let tangency = match self.tangency(&moments) {
      Ok(point) => Some(point),
      Err(err) => {
        warn!(%err, "no feasible max-Sharpe portfolio");
        None
      }
    };
    let min_variance = match self.min_variance(&moments) {
      Ok(point) => Some(point),
      Err(err) => {
        warn!(%err, "no feasible minimum-variance portfolio");
        None
      }
    };

    info!(
      assets = symbols.len(),
      observations = aligned.n_observations(),
      frontier_points = frontier.len(),
      "portfolio optimization finished"
    );

    Ok(OptimizationReport {
      symbols,
      observations: aligned.n_observations(),
      moments,
      frontier,
      tangency,
      min_variance,
    })
  }

  /// Max-Sharpe portfolio for `moments` under the configured weight policy.
  pub fn tangency(&self, moments: &Moments) -> Result<PortfolioPoint> {
    let weights = optimize_max_sharpe(
      &moments.mean,
      &moments.cov,
      self.config.risk_free,
      self.config.weight_policy,
    )?;
    let stats = evaluate_portfolio(&weights, moments, self.config.risk_free)?;
    Ok(PortfolioPoint::from_stats(stats, Some(weights)))
  }

  /// Global minimum-variance portfolio for `moments`.
  pub fn min_variance(&self, moments: &Moments) -> Result<PortfolioPoint> {
    let weights = min_variance_weights(&moments.cov)?;
    let stats = evaluate_portfolio(&weights, moments, self.config.risk_free)?;
    Ok(PortfolioPoint::from_stats(stats, Some(weights)))
  }

  /// Statistics of an arbitrary allocation (e.g. the user's current holdings).
  pub fn evaluate(&self, weights: &[f64], moments: &Moments) -> Result<PortfolioStats> {
    evaluate_portfolio(weights, moments, self.config.risk_free)
  }

  /// Statistics of an allocation given as `(symbol, weight)` pairs.
  ///
  /// Symbols missing from the report get weight zero; unknown symbols are an error.
  pub fn evaluate_allocation(
    &self,
    report: &OptimizationReport,
    allocation: &[(&str, f64)],
  ) -> Result<PortfolioStats> {
    let mut weights = vec![0.0; report.symbols.len()];
    for &(symbol, weight) in allocation {
      let idx = report
        .symbols
        .iter()
        .position(|s| s == symbol)
        .ok_or_else(|| PortfolioError::UnknownSymbol(symbol.to_string()))?;
      weights[idx] += weight;
    }
    self.evaluate(&weights, &report.moments)
  }
}
