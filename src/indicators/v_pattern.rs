//! V-shaped reversal detection
//!
//! Two phases:
//! 1. Candidates: strict local minima with two falling closes into the valley
//!    and two rising closes out of it (`p[i-2] > p[i-1] > p[i] < p[i+1] < p[i+2]`).
//! 2. Confirmation: over the 5-close window centred on the candidate, both
//!    steps into the valley must fall by at least `min_change` percent and both
//!    steps out must rise by at least `min_change` percent.
//!
//! Reported indices are valley centres, ascending, never within 2 of either end.

use std::collections::HashMap;

use crate::{
    params::{check_params, get_percent, ParamMeta, Parameterized},
    Percent, Result,
};

/// Default minimum per-step move, in percent
pub const DEFAULT_MIN_CHANGE_PCT: f64 = 1.0;

/// Closes needed on each side of a valley
const HALF_WIDTH: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct VPatternDetector {
    /// Minimum decline/rebound per step, in percent
    pub min_change: Percent,
}

impl Default for VPatternDetector {
    fn default() -> Self {
        Self {
            min_change: Percent::new_const(DEFAULT_MIN_CHANGE_PCT),
        }
    }
}

impl VPatternDetector {
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn new(min_change_pct: f64) -> Result<Self> {
        Ok(Self {
            min_change: Percent::new(min_change_pct)?,
        })
    }

    /// Confirmed valley indices in ascending order.
    pub fn detect(&self, closes: &[f64]) -> Vec<usize> {
        candidates(closes)
            .filter(|&i| self.confirm(closes, i))
            .collect()
    }

    fn confirm(&self, closes: &[f64], center: usize) -> bool {
        if center < HALF_WIDTH || center + HALF_WIDTH >= closes.len() {
            return false;
        }
        let window = &closes[center - HALF_WIDTH..=center + HALF_WIDTH];
        let step = self.min_change.get();

        let mut changes = window.windows(2).map(|w| pct_change(w[0], w[1]));
        let falling = changes.by_ref().take(HALF_WIDTH).all(|c| c <= -step);
        falling && changes.all(|c| c >= step)
    }
}

/// Indices of strict 5-close local minima
fn candidates(closes: &[f64]) -> impl Iterator<Item = usize> + '_ {
    let end = closes.len().saturating_sub(HALF_WIDTH);
    (HALF_WIDTH..end).filter(move |&i| {
        closes[i - 2] > closes[i - 1]
            && closes[i - 1] > closes[i]
            && closes[i] < closes[i + 1]
            && closes[i + 1] < closes[i + 2]
    })
}

#[inline]
fn pct_change(from: f64, to: f64) -> f64 {
    (to - from) / from * 100.0
}

impl Parameterized for VPatternDetector {
    fn param_meta() -> &'static [ParamMeta] {
        static PARAMS: [ParamMeta; 1] = [ParamMeta::percent(
            "min_change",
            DEFAULT_MIN_CHANGE_PCT,
            (0.5, 5.0, 0.5),
            "Minimum per-step decline into and rebound out of the valley, in percent",
        )];
        &PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        check_params(Self::param_meta(), params)?;
        Ok(Self {
            min_change: get_percent(params, "min_change", DEFAULT_MIN_CHANGE_PCT)?,
        })
    }
}

/// Detect with the default 1% step
pub fn find_v_patterns(closes: &[f64]) -> Vec<usize> {
    VPatternDetector::default().detect(closes)
}
