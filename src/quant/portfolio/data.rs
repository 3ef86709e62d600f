//! # Portfolio Data Utilities
//!
//! $$
//! r_t = \frac{p_t - p_{t-1}}{p_{t-1}}
//! $$
//!
//! Price alignment and return preprocessing. Histories are lined up either by
//! trailing length or by common calendar dates before returns are taken.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use ndarray::Array2;

use super::error::PortfolioError;
use super::error::Result;
use super::types::AssetHistory;

/// Return panel shared by every asset that survived alignment.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedReturns {
  /// Positions of the kept assets in the caller's input.
  pub asset_indices: Vec<usize>,
  /// `n x T` simple returns, one row per kept asset.
  pub returns: Array2<f64>,
}

impl AlignedReturns {
  pub fn n_assets(&self) -> usize {
    self.returns.nrows()
  }

  pub fn n_observations(&self) -> usize {
    self.returns.ncols()
  }
}

/// Cumulative return curves over the dates shared by every history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvolutionCurves {
  pub dates: Vec<NaiveDate>,
  pub symbols: Vec<String>,
  /// `curves[i][t] = p_i(t) / p_i(0) - 1`.
  pub curves: Vec<Vec<f64>>,
}

/// Convert price levels to simple period returns.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
  prices.windows(2).map(|w| (w[1] - w[0]) / w[0]).collect()
}

fn returns_panel(kept: Vec<(usize, Vec<f64>)>) -> AlignedReturns {
  let n = kept.len();
  let t = kept.first().map(|(_, p)| p.len().saturating_sub(1)).unwrap_or(0);

  let mut returns = Array2::<f64>::zeros((n, t));
  let mut asset_indices = Vec::with_capacity(n);
  for (row, (idx, prices)) in kept.into_iter().enumerate() {
    for (col, r) in simple_returns(&prices).into_iter().enumerate() {
      returns[[row, col]] = r;
    }
    asset_indices.push(idx);
  }

  AlignedReturns {
    asset_indices,
    returns,
  }
}

fn check_usable(n_series: usize, common_len: usize) -> Result<()> {
  if n_series < 2 {
    return Err(PortfolioError::InsufficientData {
      what: "non-empty price series",
      required: 2,
      actual: n_series,
    });
  }
  if common_len < 2 {
    return Err(PortfolioError::InsufficientData {
      what: "aligned prices",
      required: 2,
      actual: common_len,
    });
  }
  Ok(())
}

/// Align price series to their common trailing length and take returns.
///
/// Empty series are dropped. Every remaining series keeps its most recent
/// `min_len` prices, giving `min_len - 1` returns per asset.
pub fn align_returns<S: AsRef<[f64]>>(prices_per_asset: &[S]) -> Result<AlignedReturns> {
  let non_empty: Vec<(usize, &[f64])> = prices_per_asset
    .iter()
    .map(|p| p.as_ref())
    .enumerate()
    .filter(|(_, p)| !p.is_empty())
    .collect();

  let min_len = non_empty.iter().map(|(_, p)| p.len()).min().unwrap_or(0);
  check_usable(non_empty.len(), min_len)?;

  let kept = non_empty
    .into_iter()
    .map(|(idx, p)| (idx, p[p.len() - min_len..].to_vec()))
    .collect();

  Ok(returns_panel(kept))
}

fn close_by_date(history: &AssetHistory) -> BTreeMap<NaiveDate, f64> {
  history.bars.iter().map(|b| (b.date, b.close)).collect()
}

fn common_dates(maps: &[BTreeMap<NaiveDate, f64>]) -> Vec<NaiveDate> {
  let Some(first) = maps.first() else {
    return Vec::new();
  };
  let mut dates: BTreeSet<NaiveDate> = first.keys().copied().collect();
  for m in &maps[1..] {
    dates.retain(|d| m.contains_key(d));
  }
  dates.into_iter().collect()
}

/// Align histories on the dates present in all of them, then take returns.
///
/// Empty histories are dropped. A date that appears twice in one history keeps
/// its last close.
pub fn align_returns_by_date<H: Borrow<AssetHistory>>(histories: &[H]) -> Result<AlignedReturns> {
  let (indices, maps): (Vec<usize>, Vec<BTreeMap<NaiveDate, f64>>) = histories
    .iter()
    .map(<H as Borrow<AssetHistory>>::borrow)
    .enumerate()
    .filter(|(_, h)| !h.is_empty())
    .map(|(idx, h)| (idx, close_by_date(h)))
    .unzip();

  let dates = common_dates(&maps);
  check_usable(maps.len(), dates.len())?;

  let kept = indices
    .into_iter()
    .zip(maps.iter())
    .map(|(idx, m)| (idx, dates.iter().map(|d| m[d]).collect()))
    .collect();

  Ok(returns_panel(kept))
}

/// Cumulative return curves for display, over dates common to all non-empty histories.
pub fn evolution_curves(histories: &[AssetHistory]) -> EvolutionCurves {
  let non_empty: Vec<&AssetHistory> = histories.iter().filter(|h| !h.is_empty()).collect();
  let maps: Vec<BTreeMap<NaiveDate, f64>> = non_empty.iter().map(|h| close_by_date(h)).collect();
  let dates = common_dates(&maps);

  if dates.is_empty() {
    return EvolutionCurves::default();
  }

  let curves = maps
    .iter()
    .map(|m| {
      let base = m[&dates[0]];
      dates.iter().map(|d| m[d] / base - 1.0).collect()
    })
    .collect();

  EvolutionCurves {
    dates,
    symbols: non_empty.iter().map(|h| h.symbol.clone()).collect(),
    curves,
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::quant::portfolio::types::PriceBar;

  fn history(symbol: &str, points: &[(u32, f64)]) -> AssetHistory {
    AssetHistory::new(
      symbol.to_string(),
      points
        .iter()
        .map(|&(day, close)| {
          let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
          PriceBar::new(date, close, close, close, close, 0.0)
        })
        .collect(),
    )
  }

  #[test]
  fn simple_returns_are_relative_changes() {
    let r = simple_returns(&[100.0, 110.0, 99.0]);
    assert_eq!(r.len(), 2);
    assert_abs_diff_eq!(r[0], 0.1, epsilon = 1e-15);
    assert_abs_diff_eq!(r[1], -0.1, epsilon = 1e-15);
  }

  #[test]
  fn truncates_to_most_recent_common_window() {
    let prices = vec![
      vec![1.0, 2.0, 100.0, 110.0, 121.0],
      vec![50.0, 55.0, 44.0],
    ];
    let aligned = align_returns(&prices).unwrap();

    assert_eq!(aligned.n_assets(), 2);
    assert_eq!(aligned.n_observations(), 2);
    assert_abs_diff_eq!(aligned.returns[[0, 0]], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(aligned.returns[[0, 1]], 0.1, epsilon = 1e-12);
    assert_abs_diff_eq!(aligned.returns[[1, 1]], -0.2, epsilon = 1e-12);
  }

  #[test]
  fn drops_empty_series_and_tracks_indices() {
    let prices: Vec<Vec<f64>> = vec![vec![], vec![10.0, 11.0, 12.0], vec![5.0, 5.5, 6.0]];
    let aligned = align_returns(&prices).unwrap();

    assert_eq!(aligned.asset_indices, vec![1, 2]);
  }

  #[test]
  fn fails_with_fewer_than_two_series() {
    let prices = vec![vec![10.0, 11.0, 12.0], vec![]];
    let err = align_returns(&prices).unwrap_err();

    assert_eq!(
      err,
      PortfolioError::InsufficientData {
        what: "non-empty price series",
        required: 2,
        actual: 1,
      }
    );
  }

  #[test]
  fn fails_when_common_length_is_too_short() {
    let prices = vec![vec![10.0, 11.0, 12.0], vec![7.0]];
    assert!(matches!(
      align_returns(&prices),
      Err(PortfolioError::InsufficientData { actual: 1, .. })
    ));
  }

  #[test]
  fn calendar_alignment_keeps_shared_dates_only() {
    let histories = vec![
      history("AAA", &[(1, 100.0), (4, 110.0), (5, 121.0), (6, 133.1)]),
      history("BBB", &[(4, 20.0), (5, 22.0), (6, 24.2), (7, 30.0)]),
      AssetHistory::default(),
    ];
    let aligned = align_returns_by_date(&histories).unwrap();

    assert_eq!(aligned.asset_indices, vec![0, 1]);
    assert_eq!(aligned.n_observations(), 2);
    for r in aligned.returns.iter() {
      assert_abs_diff_eq!(*r, 0.1, epsilon = 1e-12);
    }
  }

  #[test]
  fn calendar_alignment_without_overlap_is_insufficient() {
    let histories = vec![
      history("AAA", &[(1, 100.0), (2, 101.0)]),
      history("BBB", &[(3, 20.0), (4, 21.0)]),
    ];
    assert!(matches!(
      align_returns_by_date(&histories),
      Err(PortfolioError::InsufficientData { what: "aligned prices", .. })
    ));
  }

  #[test]
  fn evolution_curves_start_at_zero() {
    let histories = vec![
      history("AAA", &[(1, 100.0), (2, 120.0), (3, 90.0)]),
      history("BBB", &[(2, 10.0), (3, 15.0)]),
    ];
    let evo = evolution_curves(&histories);

    assert_eq!(evo.dates.len(), 2);
    assert_eq!(evo.symbols, vec!["AAA".to_string(), "BBB".to_string()]);
    assert_abs_diff_eq!(evo.curves[0][0], 0.0, epsilon = 1e-15);
    assert_abs_diff_eq!(evo.curves[0][1], -0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(evo.curves[1][1], 0.5, epsilon = 1e-12);
  }
}
