//! # Universe Selection
//!
//! Moment estimation is `O(n^2 T)` and the solves are `O(n^3)`, so the
//! optimizable universe is capped. Assets with the longest histories win.

use std::cmp::Reverse;

use tracing::warn;

/// Indices (ascending) of at most `max_assets` entries, ranked by history length.
///
/// Ties keep input order. The returned indices are sorted so the caller's asset
/// order is preserved in everything computed downstream.
pub fn select_universe(history_lengths: &[usize], max_assets: usize) -> Vec<usize> {
  let mut ranked: Vec<usize> = (0..history_lengths.len()).collect();

  if ranked.len() > max_assets {
    ranked.sort_by_key(|&i| Reverse(history_lengths[i]));
    ranked.truncate(max_assets);
    ranked.sort_unstable();
    warn!(
      candidates = history_lengths.len(),
      kept = max_assets,
      "universe truncated to longest histories"
    );
  }

  ranked
}
