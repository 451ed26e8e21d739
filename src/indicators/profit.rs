//! Single-trade optimal profit window
//!
//! One left-to-right pass tracking the cheapest close seen so far. The best
//! window is only replaced by a strictly larger profit, so ties keep the
//! earliest pair.

use serde::{Deserialize, Serialize};

/// Best single buy followed by a later (or same-day) sell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfitWindow {
    pub buy_index: usize,
    pub sell_index: usize,
    pub buy_price: f64,
    pub sell_price: f64,
    /// `sell_price - buy_price`, never negative
    pub profit: f64,
}

impl ProfitWindow {
    /// Profit as a percentage of the buy price (0 when the buy price is 0)
    pub fn return_pct(&self) -> f64 {
        if self.buy_price > 0.0 {
            self.profit / self.buy_price * 100.0
        } else {
            0.0
        }
    }

    /// Bars held between buy and sell
    #[inline]
    pub fn holding_bars(&self) -> usize {
        self.sell_index - self.buy_index
    }
}

/// Returns `None` for fewer than 2 closes. A strictly falling series yields a
/// zero-profit window at index 0.
pub fn max_profit(closes: &[f64]) -> Option<ProfitWindow> {
    if closes.len() < 2 {
        return None;
    }

    let mut min_price = closes[0];
    let mut min_index = 0;
    let mut best = 0.0;
    let mut buy_index = 0;
    let mut sell_index = 0;

    for (i, &price) in closes.iter().enumerate().skip(1) {
        if price < min_price {
            min_price = price;
            min_index = i;
        }
        let candidate = price - min_price;
        if candidate > best {
            best = candidate;
            buy_index = min_index;
            sell_index = i;
        }
    }

    Some(ProfitWindow {
        buy_index,
        sell_index,
        buy_price: closes[buy_index],
        sell_price: closes[sell_index],
        profit: best,
    })
}
