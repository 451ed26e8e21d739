//! Parameter metadata for the analysis knobs
//!
//! Each configurable value (periods, thresholds) is described by a
//! [`ParamMeta`], enabling:
//! - Building configurations from loosely-typed input (form fields, query strings)
//! - Grid search over periods and thresholds
//! - Generating a settings panel with sensible bounds
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use stocksig::params::Parameterized;
//! use stocksig::prelude::*;
//!
//! for param in AnalysisConfig::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//!
//! let mut params = HashMap::new();
//! params.insert("short_period", 10.0);
//! let config = AnalysisConfig::with_params(&params).unwrap();
//! assert_eq!(config.short_period.get(), 10);
//! ```

use std::collections::HashMap;

use crate::{AnalysisError, Percent, Period, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Percentage value (non-negative, e.g. 5.0 for 5%)
  Percent,
  /// Period value (positive integer)
  Period,
}

/// Metadata for a single parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "short_period")
  pub name: &'static str,
  pub param_type: ParamType,
  pub default: f64,
  /// Accepted range and grid step: (min, max, step)
  pub range: (f64, f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  pub const fn percent(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Percent, default, range, description }
  }

  pub const fn period(
    name: &'static str,
    default: f64,
    range: (f64, f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Period, default, range, description }
  }

  /// Generate all values for grid search
  pub fn generate_grid(&self) -> Vec<f64> {
    let (min, max, step) = self.range;
    let mut values = Vec::new();
    let mut v = min;
    while v <= max + f64::EPSILON {
      values.push(v);
      v += step;
    }
    values
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    if !value.is_finite() {
      return Err(AnalysisError::InvalidValue("parameter cannot be NaN or infinite"));
    }
    let (min, max, _) = self.range;
    if value < min || value > max {
      return Err(AnalysisError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Percent => Ok(()),
      ParamType::Period => {
        if value < 1.0 || value.fract() != 0.0 {
          return Err(AnalysisError::InvalidValue("Period must be a positive integer"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED TRAIT
// ============================================================

/// Types that can be built from named numeric parameters
pub trait Parameterized: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a value with parameters from a HashMap
  ///
  /// Missing parameters use their default values; unknown keys and values
  /// outside the documented range are rejected.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;
}

/// Reject keys not described by `meta` and values outside their range
pub fn check_params(meta: &[ParamMeta], params: &HashMap<&str, f64>) -> Result<()> {
  for (key, &value) in params {
    let param = meta
      .iter()
      .find(|m| m.name == *key)
      .ok_or_else(|| AnalysisError::InvalidConfig(format!("unknown parameter: {key}")))?;
    param.validate(value)?;
  }
  Ok(())
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Percent from params with default fallback
pub fn get_percent(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Percent> {
  let value = params.get(key).copied().unwrap_or(default);
  Percent::new(value)
}

/// Helper to get a Period from params with default fallback
///
/// The value must be a whole number >= 1; fractions are rejected, not truncated.
pub fn get_period(params: &HashMap<&str, f64>, key: &str, default: usize) -> Result<Period> {
  let Some(&value) = params.get(key) else {
    return Period::new(default);
  };
  if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
    return Err(AnalysisError::InvalidValue("Period must be a positive integer"));
  }
  Period::new(value as usize)
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
  use super::*;
  use crate::indicators::{DisparityDetector, VPatternDetector};
  use crate::AnalysisConfig;

  #[test]
  fn test_param_meta_percent() {
    let meta = ParamMeta::percent("test_pct", 5.0, (1.0, 10.0, 1.0), "Test percent parameter");

    assert_eq!(meta.name, "test_pct");
    assert_eq!(meta.param_type, ParamType::Percent);
    assert_eq!(meta.default, 5.0);
  }

  #[test]
  fn test_generate_grid() {
    let meta = ParamMeta::period("test", 10.0, (5.0, 20.0, 5.0), "Test");

    let grid = meta.generate_grid();
    assert_eq!(grid, vec![5.0, 10.0, 15.0, 20.0]);
  }

  #[test]
  fn test_validate_period() {
    let meta = ParamMeta::period("test", 14.0, (1.0, 50.0, 1.0), "Test");

    assert!(meta.validate(14.0).is_ok());
    assert!(meta.validate(1.0).is_ok());
    assert!(meta.validate(50.0).is_ok());
    assert!(meta.validate(0.0).is_err());
    assert!(meta.validate(51.0).is_err());
    assert!(meta.validate(2.5).is_err());
    assert!(meta.validate(f64::NAN).is_err());
  }

  #[test]
  fn test_get_percent_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 2.5);

    assert!((get_percent(&params, "key1", 5.0).unwrap().get() - 2.5).abs() < f64::EPSILON);
    assert!((get_percent(&params, "key2", 5.0).unwrap().get() - 5.0).abs() < f64::EPSILON);
  }

  #[test]
  fn test_get_period_helper() {
    let mut params = HashMap::new();
    params.insert("key1", 20.0);

    assert_eq!(get_period(&params, "key1", 5).unwrap().get(), 20);
    assert_eq!(get_period(&params, "key2", 5).unwrap().get(), 5);
  }

  #[test]
  fn test_get_period_rejects_non_integers() {
    for bad in [2.7, -3.0, 0.0, f64::NAN, f64::INFINITY] {
      let mut params = HashMap::new();
      params.insert("period", bad);
      let err = get_period(&params, "period", 5).unwrap_err();
      assert_eq!(err, AnalysisError::InvalidValue("Period must be a positive integer"), "{bad}");
    }
  }

  #[test]
  fn test_config_defaults_match_meta() {
    let config = AnalysisConfig::with_params(&HashMap::new()).unwrap();
    for meta in AnalysisConfig::param_meta() {
      let value = match meta.name {
        "short_period" => config.short_period.get() as f64,
        "long_period" => config.long_period.get() as f64,
        "disparity_threshold" => config.disparity_threshold.get(),
        "v_pattern_min_change" => config.v_pattern_min_change.get(),
        other => panic!("unexpected parameter {other}"),
      };
      assert_eq!(value, meta.default, "{}", meta.name);
    }
  }

  #[test]
  fn test_unknown_key_rejected() {
    let mut params = HashMap::new();
    params.insert("shortPeriod", 5.0);
    let err = AnalysisConfig::with_params(&params).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidConfig(_)));
  }

  #[test]
  fn test_out_of_range_rejected() {
    let mut params = HashMap::new();
    params.insert("long_period", 500.0);
    let err = AnalysisConfig::with_params(&params).unwrap_err();
    assert!(matches!(err, AnalysisError::OutOfRange { field: "long_period", .. }));
  }

  #[test]
  fn test_detector_params() {
    let mut params = HashMap::new();
    params.insert("threshold", 3.0);
    let detector = DisparityDetector::with_params(&params).unwrap();
    assert_eq!(detector.threshold.get(), 3.0);

    let mut params = HashMap::new();
    params.insert("min_change", 2.0);
    let detector = VPatternDetector::with_params(&params).unwrap();
    assert_eq!(detector.min_change.get(), 2.0);
  }
}
