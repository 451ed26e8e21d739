//! # stocksig - price-series signal analytics
//!
//! Turns a daily close series into a handful of technical-analysis signals:
//! simple moving averages, golden/dead crossovers, the best single-trade
//! window, V-shaped reversals and disparity-based overbought/oversold flags.
//!
//! ## Quick Start
//!
//! ```rust
//! use stocksig::prelude::*;
//!
//! let points = vec![
//!     PricePoint::parse("2024-01-02", 10.0).unwrap(),
//!     PricePoint::parse("2024-01-03", 9.0).unwrap(),
//!     PricePoint::parse("2024-01-04", 8.0).unwrap(),
//!     PricePoint::parse("2024-01-05", 9.0).unwrap(),
//!     PricePoint::parse("2024-01-08", 10.0).unwrap(),
//! ];
//! let series = PriceSeries::new(points).unwrap();
//!
//! let analyzer = AnalyzerBuilder::new()
//!     .periods(2, 3)
//!     .build()
//!     .unwrap();
//!
//! let bundle = analyzer.analyze(&series).unwrap();
//! assert_eq!(bundle.patterns, vec![2]);
//! assert_eq!(bundle.max_profit.unwrap().profit, 2.0);
//! ```

pub mod indicators;
pub mod params;
pub mod series;

pub mod prelude {
    pub use crate::{
        // Signals
        indicators::*,
        // Parameters
        params::{get_percent, get_period, ParamMeta, ParamType, Parameterized},
        // Series model
        series::{DataRange, DateFilter, DatePreset, PricePoint, PriceSeries, PriceSummary},
        // Parallel
        analyze_parallel,
        // Pipeline
        AnalysisConfig,
        // Errors
        AnalysisError,
        Analyzer,
        AnalyzerBuilder,
        Percent,
        Period,
        Result,
        ResultBundle,
        ScanError,
        ScanResult,
    };
}

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use indicators::{
    find_crosses, max_profit, sma_with, CrossoverEvent, DisparityDetector, DisparitySignal,
    ProfitWindow, VPatternDetector, DEFAULT_MIN_CHANGE_PCT, DEFAULT_THRESHOLD_PCT,
};
use params::{check_params, get_percent, get_period, ParamMeta, Parameterized};
use series::{DataRange, DateFilter, DatePreset, PricePoint, PriceSeries, PriceSummary};

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors raised by the analytics
///
/// Sparse data is never an error: it shows up as `None` or empty results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid date for {field}: {value:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("Invalid series at index {index}: {reason}")]
    InvalidSeries { index: usize, reason: &'static str },

    #[error("Running window is empty")]
    EmptyWindow,
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Percentage value (finite, >= 0). `5.0` means 5%.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percent(f64);

impl Percent {
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(AnalysisError::InvalidValue(
                "Percent cannot be NaN or infinite",
            ));
        }
        if value < 0.0 {
            return Err(AnalysisError::InvalidValue("Percent must be >= 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Serialize for Percent {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Percent {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Percent::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(AnalysisError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// CONFIGURATION
// ============================================================

pub const DEFAULT_SHORT_PERIOD: usize = 5;
pub const DEFAULT_LONG_PERIOD: usize = 20;

/// Everything one analysis run needs besides the series itself
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub short_period: Period,
    pub long_period: Period,
    /// Disparity flag threshold against the short average, in percent
    pub disparity_threshold: Percent,
    /// Per-step move a V-pattern must show, in percent
    pub v_pattern_min_change: Percent,
    #[serde(default)]
    pub date_filter: DateFilter,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            short_period: Period::new_const(DEFAULT_SHORT_PERIOD),
            long_period: Period::new_const(DEFAULT_LONG_PERIOD),
            disparity_threshold: Percent::new_const(DEFAULT_THRESHOLD_PCT),
            v_pattern_min_change: Percent::new_const(DEFAULT_MIN_CHANGE_PCT),
            date_filter: DateFilter::default(),
        }
    }
}

impl Parameterized for AnalysisConfig {
    fn param_meta() -> &'static [ParamMeta] {
        static PARAMS: [ParamMeta; 4] = [
            ParamMeta::period(
                "short_period",
                DEFAULT_SHORT_PERIOD as f64,
                (1.0, 50.0, 1.0),
                "Window of the short moving average, in bars",
            ),
            ParamMeta::period(
                "long_period",
                DEFAULT_LONG_PERIOD as f64,
                (1.0, 100.0, 1.0),
                "Window of the long moving average, in bars",
            ),
            ParamMeta::percent(
                "disparity_threshold",
                DEFAULT_THRESHOLD_PCT,
                (0.5, 20.0, 0.5),
                "Deviation from the short average that flags overbought/oversold, in percent",
            ),
            ParamMeta::percent(
                "v_pattern_min_change",
                DEFAULT_MIN_CHANGE_PCT,
                (0.5, 5.0, 0.5),
                "Minimum per-step decline and rebound of a V-pattern, in percent",
            ),
        ];
        &PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        check_params(Self::param_meta(), params)?;
        Ok(Self {
            short_period: get_period(params, "short_period", DEFAULT_SHORT_PERIOD)?,
            long_period: get_period(params, "long_period", DEFAULT_LONG_PERIOD)?,
            disparity_threshold: get_percent(params, "disparity_threshold", DEFAULT_THRESHOLD_PCT)?,
            v_pattern_min_change: get_percent(
                params,
                "v_pattern_min_change",
                DEFAULT_MIN_CHANGE_PCT,
            )?,
            date_filter: DateFilter::default(),
        })
    }
}

// ============================================================
// RESULT BUNDLE
// ============================================================

/// Output of one analysis run. Moving averages line up index-for-index with
/// `points`; `None` means "not enough history yet", not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub symbol: Option<String>,
    pub config: AnalysisConfig,
    /// The date-filtered points every index below refers to
    pub points: Vec<PricePoint>,
    pub short_sma: Vec<Option<f64>>,
    pub long_sma: Vec<Option<f64>>,
    pub disparity_signals: Vec<DisparitySignal>,
    pub max_profit: Option<ProfitWindow>,
    pub crosses: Vec<CrossoverEvent>,
    /// Valley indices of confirmed V-patterns
    pub patterns: Vec<usize>,
    pub summary: Option<PriceSummary>,
    pub data_range: DataRange,
}

impl ResultBundle {
    fn empty(symbol: Option<&str>, config: AnalysisConfig, data_range: DataRange) -> Self {
        Self {
            symbol: symbol.map(str::to_string),
            config,
            points: Vec::new(),
            short_sma: Vec::new(),
            long_sma: Vec::new(),
            disparity_signals: Vec::new(),
            max_profit: None,
            crosses: Vec::new(),
            patterns: Vec::new(),
            summary: None,
            data_range,
        }
    }

    /// True when the date filter left nothing to analyse
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent crossover, if any
    pub fn latest_cross(&self) -> Option<&CrossoverEvent> {
        self.crosses.last()
    }
}

// ============================================================
// ANALYZER
// ============================================================

/// Runs the full pipeline with a fixed configuration.
///
/// Holds no per-run state; one instance can serve any number of series,
/// including from several threads.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    disparity: DisparityDetector,
    v_pattern: VPatternDetector,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            disparity: DisparityDetector {
                threshold: config.disparity_threshold,
            },
            v_pattern: VPatternDetector {
                min_change: config.v_pattern_min_change,
            },
        }
    }

    #[inline]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, series: &PriceSeries) -> Result<ResultBundle> {
        self.run(None, series)
    }

    /// Same as [`Analyzer::analyze`], tagging the bundle with `symbol`
    pub fn analyze_symbol(&self, symbol: &str, series: &PriceSeries) -> Result<ResultBundle> {
        self.run(Some(symbol), series)
    }

    fn run(&self, symbol: Option<&str>, series: &PriceSeries) -> Result<ResultBundle> {
        let filter = self.config.date_filter;
        let filtered = series.filter(&filter);
        let data_range = DataRange::new(series, &filtered, filter);

        if filtered.is_empty() {
            warn!(
                symbol = symbol.unwrap_or("-"),
                original = series.len(),
                start = ?filter.start,
                end = ?filter.end,
                "no price points left after date filter"
            );
            return Ok(ResultBundle::empty(symbol, self.config, data_range));
        }

        let closes = filtered.closes();
        let short_sma = sma_with(&closes, self.config.short_period);
        let long_sma = sma_with(&closes, self.config.long_period);
        let disparity_signals = self.disparity.detect(&closes, &short_sma)?;
        let max_profit = max_profit(&closes);
        let crosses = find_crosses(&short_sma, &long_sma)?;
        let patterns = self.v_pattern.detect(&closes);
        let summary = PriceSummary::from_closes(&closes);

        debug!(
            symbol = symbol.unwrap_or("-"),
            points = closes.len(),
            crosses = crosses.len(),
            patterns = patterns.len(),
            disparity_signals = disparity_signals.len(),
            "analysis complete"
        );

        Ok(ResultBundle {
            symbol: symbol.map(str::to_string),
            config: self.config,
            points: filtered.into_points(),
            short_sma,
            long_sma,
            disparity_signals,
            max_profit,
            crosses,
            patterns,
            summary,
            data_range,
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for [`Analyzer`]. Values are checked in [`AnalyzerBuilder::build`].
#[derive(Debug, Clone)]
pub struct AnalyzerBuilder {
    short_period: usize,
    long_period: usize,
    disparity_threshold: f64,
    v_pattern_min_change: f64,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            short_period: DEFAULT_SHORT_PERIOD,
            long_period: DEFAULT_LONG_PERIOD,
            disparity_threshold: DEFAULT_THRESHOLD_PCT,
            v_pattern_min_change: DEFAULT_MIN_CHANGE_PCT,
            start_date: None,
            end_date: None,
        }
    }

    /// Start from an existing configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            short_period: config.short_period.get(),
            long_period: config.long_period.get(),
            disparity_threshold: config.disparity_threshold.get(),
            v_pattern_min_change: config.v_pattern_min_change.get(),
            start_date: config.date_filter.start.map(|d| d.to_string()),
            end_date: config.date_filter.end.map(|d| d.to_string()),
        }
    }

    pub fn short_period(mut self, period: usize) -> Self {
        self.short_period = period;
        self
    }

    pub fn long_period(mut self, period: usize) -> Self {
        self.long_period = period;
        self
    }

    /// Set both moving-average windows
    pub fn periods(self, short: usize, long: usize) -> Self {
        self.short_period(short).long_period(long)
    }

    pub fn disparity_threshold(mut self, pct: f64) -> Self {
        self.disparity_threshold = pct;
        self
    }

    pub fn v_pattern_min_change(mut self, pct: f64) -> Self {
        self.v_pattern_min_change = pct;
        self
    }

    /// Inclusive lower bound, `YYYY-MM-DD`
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    /// Inclusive upper bound, `YYYY-MM-DD`
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    pub fn date_range(self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_date(start).end_date(end)
    }

    /// Use a quick range ending relative to `today`
    pub fn preset(mut self, preset: DatePreset, today: chrono::NaiveDate) -> Self {
        let filter = DateFilter::preset(preset, today);
        self.start_date = filter.start.map(|d| d.to_string());
        self.end_date = filter.end.map(|d| d.to_string());
        self
    }

    /// Analyse the whole series
    pub fn clear_dates(mut self) -> Self {
        self.start_date = None;
        self.end_date = None;
        self
    }

    /// Validate everything and produce the configuration
    pub fn build_config(self) -> Result<AnalysisConfig> {
        Ok(AnalysisConfig {
            short_period: Period::new(self.short_period)?,
            long_period: Period::new(self.long_period)?,
            disparity_threshold: Percent::new(self.disparity_threshold)?,
            v_pattern_min_change: Percent::new(self.v_pattern_min_change)?,
            date_filter: DateFilter::parse(
                self.start_date.as_deref(),
                self.end_date.as_deref(),
            )?,
        })
    }

    /// Build the analyzer
    pub fn build(self) -> Result<Analyzer> {
        Ok(Analyzer::new(self.build_config()?))
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

/// Result of analysing a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub bundle: ResultBundle,
}

/// Error from analysing a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: AnalysisError,
}

/// Analyse many instruments on the rayon pool.
///
/// Raw points are validated per instrument; a bad series lands in the error
/// list without affecting the others.
pub fn analyze_parallel<'a, I>(
    analyzer: &Analyzer,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    I: IntoParallelIterator<Item = (&'a str, &'a [PricePoint])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, points)| {
            PriceSeries::new(points.to_vec())
                .and_then(|series| analyzer.analyze_symbol(symbol, &series))
                .map(|bundle| ScanResult {
                    symbol: symbol.to_string(),
                    bundle,
                })
                .map_err(|error| {
                    debug!(symbol, %error, "instrument skipped");
                    ScanError {
                        symbol: symbol.to_string(),
                        error,
                    }
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
