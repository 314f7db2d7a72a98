//! Named defaults for every tunable
//!
//! Window lengths and thresholds were tuned empirically against the venue
//! and have no closed-form derivation. They are collected here so the
//! config types, the profiles and the tests all agree on one value.

use crate::core::Cents;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===== VENUE =====

/// Minimum price increment in cents
pub const DEFAULT_TICK_SIZE: Cents = 100;

/// Lowest price the venue accepts
pub const VENUE_MIN_BID: Cents = 1;

/// Highest price the venue accepts
pub const VENUE_MAX_ASK: Cents = 2_147_483_647;

// ===== SIZING =====

/// Lots per inner-rail order
pub const DEFAULT_LOT_SIZE: u64 = 10;

/// Lots per outer-rail order
pub const DEFAULT_OUTER_LOT_SIZE: u64 = 20;

/// Symmetric bound on the primary position, in lots
pub const DEFAULT_POSITION_LIMIT: i64 = 100;

// ===== STATISTICS WINDOWS (samples) =====

/// Trailing samples in each VWAP
pub const DEFAULT_VWAP_WINDOW: usize = 26;

/// Trailing VWAP values in the dispersion standard deviation
pub const DEFAULT_BAND_WINDOW: usize = 12;

/// Band offset multiplier applied to the VWAP deviation
pub const DEFAULT_BAND_OFFSET: Decimal = dec!(2.4);

/// Distance in samples between the two band points of a band slope
pub const DEFAULT_BAND_SLOPE_LAG: usize = 9;

/// Regression window for the VWAP trend slope
pub const DEFAULT_TREND_WINDOW: usize = 5;

/// Regression window for the mid-price slope
pub const DEFAULT_PRICE_SLOPE_WINDOW: usize = 48;

/// Simple moving average window over mids
pub const DEFAULT_AVERAGE_WINDOW: usize = 9;

/// Primary-minus-hedge spread observations kept for the rail deviation
pub const DEFAULT_SPREAD_WINDOW: usize = 1_000;

// ===== REGIME =====

/// Trailing mids averaged per instrument for the ordering flag
pub const DEFAULT_ORDERING_WINDOW: usize = 40;

/// Ordering flags that must agree with the latest one
pub const DEFAULT_STABILITY_SPAN: usize = 6;

/// How far back the agreeing span ends
pub const DEFAULT_STABILITY_LAG: usize = 2;

/// Ordering flags required before a trend can be declared
pub const DEFAULT_MIN_HISTORY: u64 = 36;

/// Primary-position samples in the position deviation
pub const DEFAULT_POSITION_WINDOW: usize = 52;

/// Position deviation (lots) at or above which the book counts as churned
pub const DEFAULT_POSITION_STD_LIMIT: i64 = 12;

/// Primary ticks a trend declaration lasts
pub const DEFAULT_TREND_DURATION: u64 = 320;

// ===== QUOTING =====

/// Inventory skew multiplier k in `-k * position / limit * tick`
pub const DEFAULT_INVENTORY_SKEW: Decimal = dec!(0.7);

/// Ticks between the quote center and each single-rail quote
pub const DEFAULT_HALF_SPREAD_TICKS: i64 = 2;

/// Cents of shift per cent-per-tick of VWAP slope
pub const DEFAULT_TREND_GAIN: i64 = 100;

/// Decay applied to the previous hedge momentum reading
pub const DEFAULT_MOMENTUM_DECAY: Decimal = dec!(0.6);

/// Inner rail distance beyond the spread deviation, in cents
pub const DEFAULT_INNER_OFFSET: Cents = 40;

/// Outer rail distance beyond the spread deviation, in cents
pub const DEFAULT_OUTER_OFFSET: Cents = 100;

// ===== HEDGING =====

/// Net exposure tolerated before a drift hedge is sent
pub const DEFAULT_DEAD_BAND: i64 = 5;

/// Lots per drift hedge
pub const DEFAULT_DRIFT_UNIT: u64 = 1;

/// Lots per trend tranche
pub const DEFAULT_TREND_TRANCHE: u64 = 10;

/// Mid slope (cents per tick) a trend tranche needs
pub const DEFAULT_TREND_SLOPE_THRESHOLD: Cents = 15;

/// Symmetric bound on the hedge position, in lots
pub const DEFAULT_HEDGE_LIMIT: i64 = 100;

// ===== LOGGING =====

pub const DEFAULT_LOG_LEVEL: &str = "info";
