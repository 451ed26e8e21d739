//! Signal computations over close prices
//!
//! Every function here is pure and works on `&[f64]` closes (or on moving
//! averages derived from them), indexed the same way as the source series.
//!
//! - **window**: fixed-capacity running-sum buffer
//! - **sma**: simple moving average on top of the running window
//! - **crossover**: golden / dead crosses between two averages
//! - **profit**: best single buy-then-sell window
//! - **v_pattern**: two-phase V-shaped reversal detection
//! - **disparity**: overbought / oversold flags from price vs. average

pub mod crossover;
pub mod disparity;
pub mod profit;
pub mod sma;
pub mod v_pattern;
pub mod window;

pub use crossover::*;
pub use disparity::*;
pub use profit::*;
pub use sma::*;
pub use v_pattern::*;
pub use window::*;
