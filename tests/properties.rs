//! Property tests for the signal functions.

use chrono::NaiveDate;
use proptest::prelude::*;
use stocksig::prelude::*;

fn closes_strategy(max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1000.0, 0..max_len)
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 1).unwrap()
}

fn brute_force_profit(closes: &[f64]) -> f64 {
    let mut best = 0.0f64;
    for i in 0..closes.len() {
        for j in i + 1..closes.len() {
            best = best.max(closes[j] - closes[i]);
        }
    }
    best
}

proptest! {
    #[test]
    fn sma_matches_window_mean(
        closes in prop::collection::vec(prop_oneof![0.0f64..1.0, 1.0f64..1000.0, 1e6f64..1e17], 0..80),
        period in 1usize..12,
    ) {
        let out = sma(&closes, period).unwrap();
        prop_assert_eq!(out.len(), closes.len());

        for (i, value) in out.iter().enumerate() {
            if i + 1 < period {
                prop_assert!(value.is_none());
            } else {
                let window = &closes[i + 1 - period..=i];
                let mean = window.iter().sum::<f64>() / period as f64;
                let got = value.unwrap();
                prop_assert_eq!(got.to_bits(), mean.to_bits(), "index {}", i);
            }
        }
    }

    #[test]
    fn max_profit_is_optimal(closes in closes_strategy(60)) {
        match max_profit(&closes) {
            None => prop_assert!(closes.len() < 2),
            Some(window) => {
                prop_assert!(closes.len() >= 2);
                prop_assert!(window.buy_index <= window.sell_index);
                prop_assert_eq!(window.buy_price, closes[window.buy_index]);
                prop_assert_eq!(window.sell_price, closes[window.sell_index]);
                prop_assert_eq!(window.profit, window.sell_price - window.buy_price);
                prop_assert_eq!(window.profit, brute_force_profit(&closes));
            }
        }
    }

    #[test]
    fn crosses_respect_ordering(closes in closes_strategy(120), short in 1usize..6, long in 6usize..15) {
        let short_sma = sma(&closes, short).unwrap();
        let long_sma = sma(&closes, long).unwrap();
        let crosses = find_crosses(&short_sma, &long_sma).unwrap();

        for pair in crosses.windows(2) {
            prop_assert!(pair[0].index < pair[1].index);
        }
        for cross in &crosses {
            let i = cross.index;
            prop_assert!(i >= long);
            let (s, l) = (short_sma[i].unwrap(), long_sma[i].unwrap());
            let (ps, pl) = (short_sma[i - 1].unwrap(), long_sma[i - 1].unwrap());
            match cross.kind {
                CrossKind::Golden => prop_assert!(ps <= pl && s > l),
                CrossKind::Dead => prop_assert!(ps >= pl && s < l),
            }
        }
    }

    #[test]
    fn v_patterns_are_confirmed_valleys(closes in closes_strategy(80), step in 0.0f64..5.0) {
        let detector = VPatternDetector::new(step).unwrap();
        let patterns = detector.detect(&closes);

        for pair in patterns.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for &i in &patterns {
            prop_assert!(i >= 2 && i + 2 < closes.len());
            prop_assert!(closes[i - 2] > closes[i - 1] && closes[i - 1] > closes[i]);
            prop_assert!(closes[i] < closes[i + 1] && closes[i + 1] < closes[i + 2]);
        }
    }

    #[test]
    fn disparity_signals_reach_threshold(closes in closes_strategy(80), period in 1usize..10, threshold in 0.5f64..20.0) {
        let avg = sma(&closes, period).unwrap();
        let detector = DisparityDetector::new(threshold).unwrap();
        let signals = detector.detect(&closes, &avg).unwrap();

        for signal in &signals {
            prop_assert!(signal.disparity.abs() >= threshold);
            prop_assert_eq!(Some(signal.sma), avg[signal.index]);
            match signal.status {
                DisparityStatus::Overbought => prop_assert!(signal.disparity > 0.0),
                DisparityStatus::Oversold => prop_assert!(signal.disparity < 0.0),
            }
        }
    }

    #[test]
    fn filter_keeps_exactly_contained_dates(
        closes in closes_strategy(60),
        from in 0u64..70,
        span in 0u64..70,
    ) {
        let series = PriceSeries::from_closes(start_date(), &closes).unwrap();
        let start = start_date().checked_add_days(chrono::Days::new(from)).unwrap();
        let end = start.checked_add_days(chrono::Days::new(span)).unwrap();
        let filter = DateFilter::new(Some(start), Some(end));

        let filtered = series.filter(&filter);
        let expected = series.points().iter().filter(|p| filter.contains(p.date)).count();
        prop_assert_eq!(filtered.len(), expected);
        prop_assert!(filtered.points().iter().all(|p| filter.contains(p.date)));
    }

    #[test]
    fn pipeline_outputs_align(closes in closes_strategy(100)) {
        let series = PriceSeries::from_closes(start_date(), &closes).unwrap();
        let bundle = AnalyzerBuilder::new().periods(3, 8).build().unwrap().analyze(&series).unwrap();

        prop_assert_eq!(bundle.points.len(), closes.len());
        prop_assert_eq!(bundle.short_sma.len(), closes.len());
        prop_assert_eq!(bundle.long_sma.len(), closes.len());
        prop_assert_eq!(bundle.max_profit.is_some(), closes.len() >= 2);
        prop_assert_eq!(bundle.data_range.total_days, closes.len());
    }
}
