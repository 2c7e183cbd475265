//! Additive interval maps used for per-base read coverage and indel evidence.
//!
//! The reference implementation layers these on top of a boost
//! `interval_map`/`interval_set` (an interval tree whose values merge
//! additively on overlap). Rust has no equivalent in `std`, and
//! `rust_lapper::Lapper` (used elsewhere in this workspace for genomic
//! interval queries) answers a different question — "which stored intervals
//! overlap x" rather than "what is the additive running weight at x". This
//! module instead keeps a sorted map of breakpoints (a difference array with
//! split-on-insert), per the Design Notes.

use std::collections::BTreeMap;
use std::ops::Range;

/// A half-open-interval-keyed map of nonnegative integer weights, additive on
/// overlap.
///
/// Internally: `breaks[k]` is the weight of every base in `[k, next_key)`.
/// The map never stores two adjacent breakpoints with the same value (a
/// "maximal run" invariant), and is empty exactly when nothing has ever been
/// inserted.
#[derive(Debug, Clone, Default)]
pub struct IntervalMap {
    breaks: BTreeMap<i64, i64>,
}

impl IntervalMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Weight at a single base.
    #[must_use]
    pub fn overlap(&self, x: i64) -> i64 {
        self.value_at(x)
    }

    /// Alias of [`IntervalMap::overlap`]; `lookup` is the name used by the
    /// contract in the specification.
    #[must_use]
    pub fn lookup(&self, x: i64) -> i64 {
        self.overlap(x)
    }

    /// Add `delta` to every base in the half-open range `[lo, hi)`.
    pub fn add(&mut self, lo: i64, hi: i64, delta: i64) {
        assert!(lo < hi, "interval must be non-empty: [{lo}, {hi})");
        self.ensure_breakpoint(lo);
        self.ensure_breakpoint(hi);

        let keys: Vec<i64> = self.breaks.range(lo..hi).map(|(k, _)| *k).collect();
        for k in keys {
            if let Some(v) = self.breaks.get_mut(&k) {
                *v += delta;
            }
        }
        self.normalize();
    }

    /// Per-base mean and population standard deviation of the weight over
    /// `[lo, hi)`, each base weighted equally (i.e. each run contributes its
    /// value `run_length` times).
    #[must_use]
    pub fn rectangle_stats(&self, lo: i64, hi: i64) -> (f64, f64) {
        if hi <= lo {
            return (0.0, 0.0);
        }
        let total = (hi - lo) as f64;
        let mut mean = 0.0;
        for (range, weight) in self.runs_in(lo, hi) {
            let len = (range.end - range.start) as f64;
            mean += len * weight as f64;
        }
        mean /= total;

        let mut var = 0.0;
        for (range, weight) in self.runs_in(lo, hi) {
            let len = (range.end - range.start) as f64;
            let diff = weight as f64 - mean;
            var += len * diff * diff;
        }
        var /= total;

        (mean, var.sqrt())
    }

    /// Maximal constant-weight runs covering `[lo, hi)`, in ascending order.
    pub fn runs_in(&self, lo: i64, hi: i64) -> Vec<(Range<i64>, i64)> {
        if hi <= lo {
            return Vec::new();
        }
        let mut bounds: Vec<i64> = self
            .breaks
            .range(lo..hi)
            .map(|(k, _)| *k)
            .filter(|k| *k > lo)
            .collect();
        bounds.insert(0, lo);
        bounds.push(hi);

        bounds
            .windows(2)
            .map(|w| (w[0]..w[1], self.value_at(w[0])))
            .collect()
    }

    /// Iterate every maximal constant-weight run ever recorded.
    pub fn runs(&self) -> Vec<(Range<i64>, i64)> {
        let keys: Vec<i64> = self.breaks.keys().copied().collect();
        keys.windows(2)
            .map(|w| (w[0]..w[1], self.breaks[&w[0]]))
            .collect()
    }

    fn value_at(&self, x: i64) -> i64 {
        self.breaks
            .range(..=x)
            .next_back()
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    fn ensure_breakpoint(&mut self, x: i64) {
        self.breaks.entry(x).or_insert_with(|| self.value_at_uninserted(x));
    }

    /// Helper for `ensure_breakpoint`: compute the would-be value of `x`
    /// without requiring `&mut self` inside the `entry` closure.
    fn value_at_uninserted(&self, x: i64) -> i64 {
        self.breaks
            .range(..x)
            .next_back()
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    fn normalize(&mut self) {
        let keys: Vec<i64> = self.breaks.keys().copied().collect();
        let mut prev_val: Option<i64> = None;
        let mut drop = Vec::new();
        for k in keys {
            let v = self.breaks[&k];
            if prev_val == Some(v) {
                drop.push(k);
            } else {
                prev_val = Some(v);
            }
        }
        for k in drop {
            self.breaks.remove(&k);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_insert_is_visible_everywhere_inside() {
        let mut m = IntervalMap::new();
        m.add(100, 200, 3);
        assert_eq!(m.overlap(100), 3);
        assert_eq!(m.overlap(150), 3);
        assert_eq!(m.overlap(199), 3);
        assert_eq!(m.overlap(200), 0);
        assert_eq!(m.overlap(99), 0);
    }

    #[test]
    fn overlapping_inserts_are_additive() {
        let mut m = IntervalMap::new();
        m.add(0, 100, 1);
        m.add(50, 150, 2);
        assert_eq!(m.overlap(25), 1);
        assert_eq!(m.overlap(75), 3);
        assert_eq!(m.overlap(125), 2);
        assert_eq!(m.overlap(150), 0);
    }

    #[test]
    fn rectangle_stats_matches_direct_computation() {
        let mut m = IntervalMap::new();
        m.add(0, 10, 2);
        m.add(10, 20, 4);

        let mut direct = Vec::new();
        for x in 0..20 {
            direct.push(m.overlap(x) as f64);
        }
        let mean = direct.iter().sum::<f64>() / direct.len() as f64;
        let var = direct.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / direct.len() as f64;

        let (got_mean, got_std) = m.rectangle_stats(0, 20);
        assert!((got_mean - mean).abs() < 1e-9);
        assert!((got_std - var.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn runs_are_maximal_and_non_adjacent_duplicates() {
        let mut m = IntervalMap::new();
        m.add(0, 10, 1);
        m.add(10, 20, 1); // same weight as the first run: should merge
        let runs = m.runs();
        assert_eq!(runs, vec![(0..20, 1)]);
    }

    #[test]
    fn empty_map_has_zero_weight_everywhere() {
        let m = IntervalMap::new();
        assert_eq!(m.overlap(0), 0);
        assert_eq!(m.rectangle_stats(0, 100), (0.0, 0.0));
    }
}
