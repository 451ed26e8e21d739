//! Disparity (price vs. moving average) overbought / oversold flags
//!
//! `disparity = (price - sma) / sma * 100`. Every index whose absolute
//! disparity reaches the threshold is reported on its own; there is no
//! smoothing, so consecutive days can all be flagged.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    params::{check_params, get_percent, ParamMeta, Parameterized},
    AnalysisError, Percent, Result,
};

/// Default disparity threshold, in percent
pub const DEFAULT_THRESHOLD_PCT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisparityStatus {
    Overbought,
    Oversold,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisparitySignal {
    pub index: usize,
    pub price: f64,
    pub sma: f64,
    /// Percentage deviation of `price` from `sma`
    pub disparity: f64,
    pub status: DisparityStatus,
}

#[derive(Debug, Clone, Copy)]
pub struct DisparityDetector {
    pub threshold: Percent,
}

impl Default for DisparityDetector {
    fn default() -> Self {
        Self {
            threshold: Percent::new_const(DEFAULT_THRESHOLD_PCT),
        }
    }
}

impl DisparityDetector {
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn new(threshold_pct: f64) -> Result<Self> {
        Ok(Self {
            threshold: Percent::new(threshold_pct)?,
        })
    }

    /// Flag closes deviating from `sma` by at least the threshold.
    ///
    /// Indices where the average is absent or exactly zero are skipped.
    pub fn detect(&self, closes: &[f64], sma: &[Option<f64>]) -> Result<Vec<DisparitySignal>> {
        if closes.len() != sma.len() {
            return Err(AnalysisError::InvalidConfig(format!(
                "price series has {} points but moving average has {}",
                closes.len(),
                sma.len()
            )));
        }

        let threshold = self.threshold.get();
        let signals = closes
            .iter()
            .zip(sma)
            .enumerate()
            .filter_map(|(index, (&price, &avg))| {
                let avg = avg.filter(|a| *a != 0.0)?;
                let disparity = (price - avg) / avg * 100.0;
                if disparity.abs() < threshold {
                    return None;
                }
                let status = if disparity > 0.0 {
                    DisparityStatus::Overbought
                } else {
                    DisparityStatus::Oversold
                };
                Some(DisparitySignal {
                    index,
                    price,
                    sma: avg,
                    disparity,
                    status,
                })
            })
            .collect();

        Ok(signals)
    }
}

impl Parameterized for DisparityDetector {
    fn param_meta() -> &'static [ParamMeta] {
        static PARAMS: [ParamMeta; 1] = [ParamMeta::percent(
            "threshold",
            DEFAULT_THRESHOLD_PCT,
            (0.5, 20.0, 0.5),
            "Minimum |price - SMA| / SMA, in percent, to flag a close",
        )];
        &PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        check_params(Self::param_meta(), params)?;
        Ok(Self {
            threshold: get_percent(params, "threshold", DEFAULT_THRESHOLD_PCT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overbought_and_oversold() {
        let closes = [100.0, 110.0, 90.0, 103.0];
        let sma = [None, Some(100.0), Some(100.0), Some(100.0)];
        let signals = DisparityDetector::default().detect(&closes, &sma).unwrap();

        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].index, 1);
        assert_eq!(signals[0].status, DisparityStatus::Overbought);
        assert!((signals[0].disparity - 10.0).abs() < 1e-9);
        assert_eq!(signals[1].index, 2);
        assert_eq!(signals[1].status, DisparityStatus::Oversold);
        assert!((signals[1].disparity + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let closes = [105.0, 95.0];
        let sma = [Some(100.0), Some(100.0)];
        let signals = DisparityDetector::default().detect(&closes, &sma).unwrap();
        assert_eq!(signals.len(), 2);
    }

    #[test]
    fn test_custom_threshold() {
        let closes = [102.0, 97.0];
        let sma = [Some(100.0), Some(100.0)];
        let strict = DisparityDetector::new(2.5).unwrap();
        let signals = strict.detect(&closes, &sma).unwrap();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].status, DisparityStatus::Oversold);
    }

    #[test]
    fn test_zero_average_skipped() {
        let signals = DisparityDetector::default()
            .detect(&[0.0, 1.0], &[Some(0.0), Some(0.0)])
            .unwrap();
        assert!(signals.is_empty());
    }

    #[test]
    fn test_length_mismatch() {
        assert!(DisparityDetector::default()
            .detect(&[1.0, 2.0], &[Some(1.0)])
            .is_err());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        assert!(DisparityDetector::new(-1.0).is_err());
        assert!(DisparityDetector::new(f64::NAN).is_err());
    }
}
