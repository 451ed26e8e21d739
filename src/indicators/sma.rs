//! Simple moving average
//!
//! Index `i` is `None` until `period` closes have been seen ending at `i`, then
//! the arithmetic mean of `closes[i + 1 - period..=i]`.

use super::window::RunningWindow;
use crate::{Period, Result};

/// SMA over raw closes. `period == 0` is rejected.
pub fn sma(closes: &[f64], period: usize) -> Result<Vec<Option<f64>>> {
    let period = Period::new(period)?;
    Ok(sma_with(closes, period))
}

/// SMA with an already-validated period
pub fn sma_with(closes: &[f64], period: Period) -> Vec<Option<f64>> {
    let mut window = RunningWindow::new(period);
    closes
        .iter()
        .map(|&close| {
            window.push(close);
            window.mean()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_series_eq(got: &[Option<f64>], want: &[Option<f64>]) {
        assert_eq!(got.len(), want.len());
        for (i, (g, w)) in got.iter().zip(want).enumerate() {
            match (g, w) {
                (None, None) => {}
                (Some(g), Some(w)) => assert!((g - w).abs() < 1e-9, "index {i}: {g} != {w}"),
                _ => panic!("index {i}: {g:?} != {w:?}"),
            }
        }
    }

    #[test]
    fn test_reference_series_period_3() {
        let closes = [10.0, 9.0, 8.0, 9.0, 10.0, 11.0, 9.0, 7.0, 8.0, 9.0, 10.0];
        let got = sma(&closes, 3).unwrap();
        let want = [
            None,
            None,
            Some(9.0),
            Some(26.0 / 3.0),
            Some(9.0),
            Some(10.0),
            Some(10.0),
            Some(9.0),
            Some(8.0),
            Some(8.0),
            Some(9.0),
        ];
        assert_series_eq(&got, &want);
    }

    #[test]
    fn test_period_zero_rejected() {
        assert!(sma(&[1.0, 2.0], 0).is_err());
    }

    #[test]
    fn test_short_series_all_absent() {
        let got = sma(&[1.0, 2.0, 3.0], 4).unwrap();
        assert_eq!(got, vec![None, None, None]);
        assert!(sma(&[], 3).unwrap().is_empty());
    }

    #[test]
    fn test_period_one_is_identity() {
        let closes = [4.0, 8.5, 1.25];
        let got = sma(&closes, 1).unwrap();
        assert_eq!(got, vec![Some(4.0), Some(8.5), Some(1.25)]);
    }

    #[test]
    fn test_matches_explicit_resum() {
        let closes: Vec<f64> = (0..200).map(|i| 100.0 + ((i * 37) % 23) as f64 * 0.7).collect();
        for period in [2, 5, 20, 50] {
            let got = sma(&closes, period).unwrap();
            let want: Vec<Option<f64>> = (0..closes.len())
                .map(|i| {
                    (i + 1 >= period)
                        .then(|| closes[i + 1 - period..=i].iter().sum::<f64>() / period as f64)
                })
                .collect();
            assert_eq!(got, want, "period {period}");
        }
    }

    #[test]
    fn test_spike_then_flat_matches_resum_exactly() {
        let got = sma(&[1e17, 1.0, 1.0, 1.0, 1.0], 2).unwrap();
        assert_eq!(got, vec![None, Some(5e16), Some(1.0), Some(1.0), Some(1.0)]);

        let mut closes = vec![98765.4321, 0.07];
        closes.extend([0.07; 20]);
        for period in [5, 20] {
            let got = sma(&closes, period).unwrap();
            let tail = closes[closes.len() - period..].iter().sum::<f64>() / period as f64;
            let last = got.last().copied().flatten().unwrap();
            assert_eq!(last.to_bits(), tail.to_bits(), "period {period}");
        }
    }
}
