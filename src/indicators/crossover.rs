//! Golden / dead cross detection between a short and a long moving average

use serde::{Deserialize, Serialize};

use crate::{AnalysisError, Result};

/// Direction of a moving-average crossover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossKind {
    /// Short average crosses above the long average
    Golden,
    /// Short average crosses below the long average
    Dead,
}

impl CrossKind {
    #[inline]
    pub fn is_golden(self) -> bool {
        matches!(self, CrossKind::Golden)
    }

    #[inline]
    pub fn is_dead(self) -> bool {
        matches!(self, CrossKind::Dead)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverEvent {
    pub kind: CrossKind,
    /// Index where the new ordering first holds; both averages are defined at `index - 1` and `index`
    pub index: usize,
}

/// Scan two equal-length averages for crossovers, in index order.
///
/// A golden cross needs `prev_short <= prev_long` and `curr_short > curr_long`;
/// a dead cross needs `prev_short >= prev_long` and `curr_short < curr_long`.
/// Golden is checked first. Positions where any of the four values is absent
/// are skipped.
pub fn find_crosses(short: &[Option<f64>], long: &[Option<f64>]) -> Result<Vec<CrossoverEvent>> {
    if short.len() != long.len() {
        return Err(AnalysisError::InvalidConfig(format!(
            "moving averages differ in length: short {} vs long {}",
            short.len(),
            long.len()
        )));
    }

    let mut crosses = Vec::new();
    for i in 1..short.len() {
        let (Some(prev_short), Some(curr_short), Some(prev_long), Some(curr_long)) =
            (short[i - 1], short[i], long[i - 1], long[i])
        else {
            continue;
        };

        if prev_short <= prev_long && curr_short > curr_long {
            crosses.push(CrossoverEvent {
                kind: CrossKind::Golden,
                index: i,
            });
        } else if prev_short >= prev_long && curr_short < curr_long {
            crosses.push(CrossoverEvent {
                kind: CrossKind::Dead,
                index: i,
            });
        }
    }

    Ok(crosses)
}
