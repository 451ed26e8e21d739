//! Price series model and date-range handling
//!
//! A [`PriceSeries`] is the only input the analytics accept: closes ordered by
//! strictly increasing calendar date. Index `i` in the series is the unit every
//! derived signal refers to; the date travels alongside for display.

use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{AnalysisError, Result};

// ============================================================
// PRICE POINT
// ============================================================

/// One daily quote. Only `close` feeds the analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }

    /// Build from an ISO `YYYY-MM-DD` date string
    pub fn parse(date: &str, close: f64) -> Result<Self> {
        Ok(Self::new(parse_date("date", date)?, close))
    }

    pub fn with_ohlcv(mut self, open: f64, high: f64, low: f64, volume: f64) -> Self {
        self.open = Some(open);
        self.high = Some(high);
        self.low = Some(low);
        self.volume = Some(volume);
        self
    }
}

/// Parse an ISO `YYYY-MM-DD` date, naming the offending field on failure
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| AnalysisError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

// ============================================================
// PRICE SERIES
// ============================================================

/// Validated, date-ordered sequence of [`PricePoint`]s
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Validate ordering and closes.
    ///
    /// Dates must be strictly increasing (which also rules out duplicates) and
    /// every close must be finite and non-negative.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for (index, point) in points.iter().enumerate() {
            if !point.close.is_finite() {
                return Err(AnalysisError::InvalidSeries {
                    index,
                    reason: "close is NaN or infinite",
                });
            }
            if point.close < 0.0 {
                return Err(AnalysisError::InvalidSeries {
                    index,
                    reason: "close is negative",
                });
            }
            if index > 0 && point.date <= points[index - 1].date {
                return Err(AnalysisError::InvalidSeries {
                    index,
                    reason: "dates must be strictly increasing",
                });
            }
        }
        Ok(Self { points })
    }

    /// Consecutive calendar days starting at `start`, one per close.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(index, &close)| {
                start
                    .checked_add_days(Days::new(index as u64))
                    .map(|date| PricePoint::new(date, close))
                    .ok_or(AnalysisError::InvalidSeries {
                        index,
                        reason: "date out of range",
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(points)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Index of `date` by binary search
    pub fn position_of(&self, date: NaiveDate) -> Option<usize> {
        self.points.binary_search_by(|p| p.date.cmp(&date)).ok()
    }

    /// Points within the filter's inclusive bounds.
    ///
    /// A start after the end selects nothing.
    pub fn filter(&self, filter: &DateFilter) -> PriceSeries {
        let lo = filter
            .start
            .map_or(0, |start| self.points.partition_point(|p| p.date < start));
        let hi = filter.end.map_or(self.points.len(), |end| {
            self.points.partition_point(|p| p.date <= end)
        });
        let points = if lo < hi {
            self.points[lo..hi].to_vec()
        } else {
            Vec::new()
        };
        PriceSeries { points }
    }
}

impl Serialize for PriceSeries {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.points.serialize(s)
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let points = Vec::<PricePoint>::deserialize(d)?;
        PriceSeries::new(points).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// DATE FILTER
// ============================================================

/// Inclusive date bounds; `None` leaves that side open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateFilter {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Parse optional ISO bounds. Empty strings mean "unbounded".
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let parse = |field, value: Option<&str>| {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| parse_date(field, v))
                .transpose()
        };
        Ok(Self {
            start: parse("start_date", start)?,
            end: parse("end_date", end)?,
        })
    }

    /// Resolve a quick-range preset relative to `today`
    pub fn preset(preset: DatePreset, today: NaiveDate) -> Self {
        let months_back = |n| today.checked_sub_months(Months::new(n));
        match preset {
            DatePreset::OneMonth => Self::new(months_back(1), Some(today)),
            DatePreset::ThreeMonths => Self::new(months_back(3), Some(today)),
            DatePreset::SixMonths => Self::new(months_back(6), Some(today)),
            DatePreset::OneYear => Self::new(months_back(12), Some(today)),
            DatePreset::YearToDate => {
                Self::new(NaiveDate::from_ymd_opt(today.year(), 1, 1), Some(today))
            }
            DatePreset::LastYear => {
                let year = today.year() - 1;
                Self::new(
                    NaiveDate::from_ymd_opt(year, 1, 1),
                    NaiveDate::from_ymd_opt(year, 12, 31),
                )
            }
        }
    }

    /// True when at least one bound is set
    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// Quick date ranges offered next to the custom range picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatePreset {
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "1year")]
    OneYear,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "lastyear")]
    LastYear,
}

impl DatePreset {
    pub const ALL: [DatePreset; 6] = [
        DatePreset::OneMonth,
        DatePreset::ThreeMonths,
        DatePreset::SixMonths,
        DatePreset::OneYear,
        DatePreset::YearToDate,
        DatePreset::LastYear,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DatePreset::OneMonth => "1month",
            DatePreset::ThreeMonths => "3months",
            DatePreset::SixMonths => "6months",
            DatePreset::OneYear => "1year",
            DatePreset::YearToDate => "ytd",
            DatePreset::LastYear => "lastyear",
        }
    }
}

impl FromStr for DatePreset {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        DatePreset::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| AnalysisError::InvalidConfig(format!("unknown date preset: {s}")))
    }
}

// ============================================================
// RANGE METADATA / SUMMARY
// ============================================================

/// What was actually analysed, next to what was supplied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub total_days: usize,
    pub is_filtered: bool,
    pub original_start: Option<NaiveDate>,
    pub original_end: Option<NaiveDate>,
    pub original_total_days: usize,
    pub custom_range: DateFilter,
}

impl DataRange {
    pub fn new(original: &PriceSeries, filtered: &PriceSeries, filter: DateFilter) -> Self {
        Self {
            start: filtered.first().map(|p| p.date),
            end: filtered.last().map(|p| p.date),
            total_days: filtered.len(),
            is_filtered: filter.is_bounded(),
            original_start: original.first().map(|p| p.date),
            original_end: original.last().map(|p| p.date),
            original_total_days: original.len(),
            custom_range: filter,
        }
    }
}

/// Headline numbers for the analysed window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub current_price: f64,
    /// Close before the last one (equal to `current_price` for a single point)
    pub previous_price: f64,
    pub change: f64,
    /// Percent change from the previous close; 0 when that close is 0
    pub change_pct: f64,
    pub high: f64,
    pub low: f64,
    /// `high - low`
    pub spread: f64,
}

impl PriceSummary {
    pub fn from_closes(closes: &[f64]) -> Option<Self> {
        let current_price = *closes.last()?;
        let previous_price = closes
            .len()
            .checked_sub(2)
            .map_or(current_price, |i| closes[i]);
        let change = current_price - previous_price;
        let change_pct = if previous_price > 0.0 {
            change / previous_price * 100.0
        } else {
            0.0
        };
        let (low, high) = closes
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| {
                (lo.min(c), hi.max(c))
            });

        Some(Self {
            current_price,
            previous_price,
            change,
            change_pct,
            high,
            low,
            spread: high - low,
        })
    }
}

// ============================================================
// TESTS
// ============================================================
