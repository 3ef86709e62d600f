//! # Efficient Frontier
//!
//! $$
//! \begin{bmatrix} 2\Sigma & -\mu & -\mathbf{1} \\ \mu^\top & 0 & 0 \\ \mathbf{1}^\top & 0 & 0 \end{bmatrix}
//! \begin{bmatrix} \mathbf{w} \\ \lambda \\ \gamma \end{bmatrix}
//! = \begin{bmatrix} \mathbf{0} \\ \mu^\* \\ 1 \end{bmatrix}
//! $$
//!
//! Minimum-variance portfolios for target returns, solved exactly through the
//! KKT system of the equality-constrained QP. Weights are sign-unconstrained.

use ndarray::s;
use ndarray::Array1;
use ndarray::Array2;
use ordered_float::OrderedFloat;
use tracing::debug;

use super::error::PortfolioError;
use super::error::Result;
use super::linalg::solve_linear_system_with_tolerance;
use super::linalg::FRONTIER_PIVOT_TOLERANCE;
use super::metrics::evaluate_portfolio;
use super::moments::estimate_moments;
use super::moments::Moments;
use super::types::PortfolioPoint;
use super::types::DEFAULT_RISK_FREE;

fn check_square(cov: &Array2<f64>, n: usize) -> Result<()> {
  if cov.dim() != (n, n) {
    return Err(PortfolioError::DimensionMismatch {
      context: "covariance matrix",
      expected: n,
      actual: if cov.nrows() != n { cov.nrows() } else { cov.ncols() },
    });
  }
  Ok(())
}

/// Frontier weights for one target return.
pub fn frontier_weights(moments: &Moments, target_return: f64) -> Result<Vec<f64>> {
  let n = moments.n_assets();
  check_square(&moments.cov, n)?;

  let mut kkt = Array2::<f64>::zeros((n + 2, n + 2));
  kkt
    .slice_mut(s![..n, ..n])
    .assign(&(&moments.cov * 2.0));
  for i in 0..n {
    kkt[[i, n]] = -moments.mean[i];
    kkt[[i, n + 1]] = -1.0;
    kkt[[n, i]] = moments.mean[i];
    kkt[[n + 1, i]] = 1.0;
  }

  let mut rhs = Array1::<f64>::zeros(n + 2);
  rhs[n] = target_return;
  rhs[n + 1] = 1.0;

  let x = solve_linear_system_with_tolerance(&kkt, &rhs, FRONTIER_PIVOT_TOLERANCE)?;
  Ok(x.iter().take(n).copied().collect())
}

/// Global minimum-variance weights: the KKT solve with only the budget constraint.
pub fn min_variance_weights(cov: &Array2<f64>) -> Result<Vec<f64>> {
  let n = cov.nrows();
  check_square(cov, n)?;

  let mut kkt = Array2::<f64>::zeros((n + 1, n + 1));
  kkt.slice_mut(s![..n, ..n]).assign(&(cov * 2.0));
  for i in 0..n {
    kkt[[i, n]] = -1.0;
    kkt[[n, i]] = 1.0;
  }

  let mut rhs = Array1::<f64>::zeros(n + 1);
  rhs[n] = 1.0;

  let x = solve_linear_system_with_tolerance(&kkt, &rhs, FRONTIER_PIVOT_TOLERANCE)?;
  Ok(x.iter().take(n).copied().collect())
}

/// `n_points + 1` equally spaced targets spanning the single-asset mean returns.
pub fn target_returns(moments: &Moments, n_points: usize) -> Vec<f64> {
  let Some((lo, hi)) = moments.return_range() else {
    return Vec::new();
  };
  if n_points == 0 {
    return vec![lo];
  }

  let step = (hi - lo) / n_points as f64;
  (0..=n_points)
    .map(|k| if k == n_points { hi } else { lo + step * k as f64 })
    .collect()
}

/// Trace the efficient frontier, sorted ascending by risk.
///
/// Targets whose KKT system is singular are skipped. A single asset yields its
/// own point with weight 1; no assets yield an empty frontier.
pub fn efficient_frontier(
  moments: &Moments,
  n_points: usize,
  risk_free: f64,
) -> Vec<PortfolioPoint> {
  let n = moments.n_assets();
  if n == 0 {
    return Vec::new();
  }

  if n == 1 {
    let weights = vec![1.0];
    return evaluate_portfolio(&weights, moments, risk_free)
      .map(|stats| vec![PortfolioPoint::from_stats(stats, Some(weights))])
      .unwrap_or_default();
  }

  let targets = target_returns(moments, n_points);
  let mut points = Vec::with_capacity(targets.len());
  for target in targets {
    let weights = match frontier_weights(moments, target) {
      Ok(w) => w,
      Err(err) => {
        debug!(target_return = target, %err, "skipping frontier target");
        continue;
      }
    };
    match evaluate_portfolio(&weights, moments, risk_free) {
      Ok(stats) => points.push(PortfolioPoint::from_stats(stats, Some(weights))),
      Err(err) => debug!(target_return = target, %err, "skipping frontier target"),
    }
  }

  points.sort_by_key(|p| OrderedFloat(p.risk));
  points
}

/// Estimate moments from an `n x T` return panel and trace the frontier
/// with the default risk-free rate.
pub fn compute_efficient_frontier(
  asset_returns: &Array2<f64>,
  n_points: usize,
) -> Vec<PortfolioPoint> {
  let moments = estimate_moments(asset_returns);
  efficient_frontier(&moments, n_points, DEFAULT_RISK_FREE)
}
