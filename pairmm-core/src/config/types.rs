use super::constants::*;
use crate::core::fixed_point::{self, MILLI};
use crate::core::Cents;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A field failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid config `{field}`: {reason}")]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Main configuration structure
///
/// Every section has defaults, so a config file only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub instrument: InstrumentConfig,
    pub statistics: StatisticsConfig,
    pub regime: RegimeConfig,
    pub quoting: QuotingConfig,
    pub hedge: HedgeConfig,
    pub logging: LoggingConfig,
}

/// Venue and sizing parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentConfig {
    /// Minimum price increment in cents
    pub tick_size: Cents,
    /// Inner-rail lots per order
    pub lot_size: u64,
    /// Outer-rail lots per order (multi-rail only)
    pub outer_lot_size: u64,
    /// Symmetric bound on the primary position
    pub position_limit: i64,
    /// Lowest tradable price; hedge sells are sent one tick above it
    pub min_bid: Cents,
    /// Highest tradable price; hedge buys are sent at it
    pub max_ask: Cents,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            tick_size: DEFAULT_TICK_SIZE,
            lot_size: DEFAULT_LOT_SIZE,
            outer_lot_size: DEFAULT_OUTER_LOT_SIZE,
            position_limit: DEFAULT_POSITION_LIMIT,
            min_bid: VENUE_MIN_BID,
            max_ask: VENUE_MAX_ASK,
        }
    }
}

/// Rolling window lengths, in samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    pub vwap_window: usize,
    pub band_window: usize,
    /// Multiplier on the VWAP deviation, e.g. 2.4
    pub band_offset: Decimal,
    pub band_slope_lag: usize,
    pub trend_window: usize,
    pub price_slope_window: usize,
    pub average_window: usize,
    pub spread_window: usize,
}

impl StatisticsConfig {
    /// Band offset in thousandths
    pub fn band_offset_milli(&self) -> i64 {
        fixed_point::decimal_to_milli(self.band_offset).unwrap_or(0)
    }
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            vwap_window: DEFAULT_VWAP_WINDOW,
            band_window: DEFAULT_BAND_WINDOW,
            band_offset: DEFAULT_BAND_OFFSET,
            band_slope_lag: DEFAULT_BAND_SLOPE_LAG,
            trend_window: DEFAULT_TREND_WINDOW,
            price_slope_window: DEFAULT_PRICE_SLOPE_WINDOW,
            average_window: DEFAULT_AVERAGE_WINDOW,
            spread_window: DEFAULT_SPREAD_WINDOW,
        }
    }
}

/// Trend detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    /// When false the detector always reports Normal
    pub enabled: bool,
    pub ordering_window: usize,
    pub stability_span: usize,
    pub stability_lag: usize,
    pub min_history: u64,
    pub position_window: usize,
    /// Position deviation (lots) that forces Normal
    pub position_std_limit: i64,
    /// Primary ticks a trend declaration lasts
    pub trend_duration: u64,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ordering_window: DEFAULT_ORDERING_WINDOW,
            stability_span: DEFAULT_STABILITY_SPAN,
            stability_lag: DEFAULT_STABILITY_LAG,
            min_history: DEFAULT_MIN_HISTORY,
            position_window: DEFAULT_POSITION_WINDOW,
            position_std_limit: DEFAULT_POSITION_STD_LIMIT,
            trend_duration: DEFAULT_TREND_DURATION,
        }
    }
}

/// Which quoting strategy runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyVariant {
    /// One bid and one ask around a VWAP-style anchor
    SingleRail,
    /// Inner and outer rails around the hedge mid
    MultiRail,
}

/// Reference price for the single-rail quote center
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Vwap,
    ImbalanceMid,
}

/// How a tier is sized when the full lot does not fit under the limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    /// Place the whole lot or nothing
    FullLot,
    /// Place whatever capacity remains
    Shrink,
}

/// Price and size construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotingConfig {
    pub variant: StrategyVariant,
    pub anchor: Anchor,
    /// Inventory skew multiplier k
    pub inventory_skew: Decimal,
    /// Single-rail distance from center to each quote, in ticks
    pub half_spread_ticks: i64,
    /// Cents of shift per cent-per-tick of trend slope; 0 disables
    pub trend_gain: i64,
    pub momentum_enabled: bool,
    pub momentum_decay: Decimal,
    /// Only open a side when the band reversal signal points that way
    pub reversal_gate: bool,
    pub inner_offset: Cents,
    pub outer_offset: Cents,
    pub size_policy: SizePolicy,
    /// Shrink resting orders in place instead of leaving them oversized
    pub amend: bool,
}

impl QuotingConfig {
    pub fn inventory_skew_milli(&self) -> i64 {
        fixed_point::decimal_to_milli(self.inventory_skew).unwrap_or(0)
    }

    pub fn momentum_decay_milli(&self) -> i64 {
        fixed_point::decimal_to_milli(self.momentum_decay).unwrap_or(0)
    }
}

impl Default for QuotingConfig {
    fn default() -> Self {
        Self {
            variant: StrategyVariant::SingleRail,
            anchor: Anchor::ImbalanceMid,
            inventory_skew: DEFAULT_INVENTORY_SKEW,
            half_spread_ticks: DEFAULT_HALF_SPREAD_TICKS,
            trend_gain: DEFAULT_TREND_GAIN,
            momentum_enabled: true,
            momentum_decay: DEFAULT_MOMENTUM_DECAY,
            reversal_gate: false,
            inner_offset: DEFAULT_INNER_OFFSET,
            outer_offset: DEFAULT_OUTER_OFFSET,
            size_policy: SizePolicy::FullLot,
            amend: false,
        }
    }
}

/// Offsetting orders on the hedge instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HedgeConfig {
    /// Hedge every primary fill 1:1 while Normal
    pub on_fill: bool,
    /// Net exposure tolerated before a drift hedge; `None` disables drift hedging
    pub dead_band: Option<i64>,
    pub drift_unit: u64,
    /// Tranche hedging while Trending
    pub trend_enabled: bool,
    pub trend_tranche: u64,
    /// Mid slope in cents per tick a tranche needs
    pub trend_slope_threshold: Cents,
    pub hedge_limit: i64,
}

impl Default for HedgeConfig {
    fn default() -> Self {
        Self {
            on_fill: true,
            dead_band: None,
            drift_unit: DEFAULT_DRIFT_UNIT,
            trend_enabled: false,
            trend_tranche: DEFAULT_TREND_TRANCHE,
            trend_slope_threshold: DEFAULT_TREND_SLOPE_THRESHOLD,
            hedge_limit: DEFAULT_HEDGE_LIMIT,
        }
    }
}

/// Log output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json: false,
        }
    }
}

impl EngineConfig {
    /// Check every field; the first failure is returned
    pub fn validate(&self) -> Result<(), ConfigError> {
        let inst = &self.instrument;
        if inst.tick_size <= 0 {
            return Err(ConfigError::new("instrument.tick_size", "must be positive"));
        }
        if inst.position_limit <= 0 {
            return Err(ConfigError::new("instrument.position_limit", "must be positive"));
        }
        if inst.lot_size == 0 || inst.lot_size as i64 > inst.position_limit {
            return Err(ConfigError::new(
                "instrument.lot_size",
                format!("must be in 1..={}", inst.position_limit),
            ));
        }
        if inst.outer_lot_size as i64 > inst.position_limit {
            return Err(ConfigError::new(
                "instrument.outer_lot_size",
                format!("must not exceed {}", inst.position_limit),
            ));
        }
        if inst.min_bid <= 0 || inst.max_ask < inst.min_bid + inst.tick_size {
            return Err(ConfigError::new(
                "instrument.max_ask",
                "price range must span at least one tick above min_bid",
            ));
        }

        let stats = &self.statistics;
        for (field, value) in [
            ("statistics.vwap_window", stats.vwap_window),
            ("statistics.band_window", stats.band_window),
            ("statistics.band_slope_lag", stats.band_slope_lag),
            ("statistics.trend_window", stats.trend_window),
            ("statistics.price_slope_window", stats.price_slope_window),
            ("statistics.average_window", stats.average_window),
            ("statistics.spread_window", stats.spread_window),
        ] {
            if value == 0 {
                return Err(ConfigError::new(field, "window must be at least 1"));
            }
        }
        // A regression through fewer than two points has no slope
        if stats.trend_window < 2 || stats.price_slope_window < 2 {
            return Err(ConfigError::new(
                "statistics.trend_window",
                "regression windows need at least 2 samples",
            ));
        }
        check_multiplier("statistics.band_offset", stats.band_offset)?;

        let regime = &self.regime;
        if regime.enabled {
            for (field, value) in [
                ("regime.ordering_window", regime.ordering_window),
                ("regime.stability_span", regime.stability_span),
                ("regime.position_window", regime.position_window),
            ] {
                if value == 0 {
                    return Err(ConfigError::new(field, "window must be at least 1"));
                }
            }
            if regime.position_std_limit <= 0 || regime.trend_duration == 0 {
                return Err(ConfigError::new(
                    "regime.trend_duration",
                    "thresholds must be positive",
                ));
            }
        }

        let quoting = &self.quoting;
        check_multiplier("quoting.inventory_skew", quoting.inventory_skew)?;
        check_multiplier("quoting.momentum_decay", quoting.momentum_decay)?;
        if quoting.momentum_decay_milli() >= MILLI {
            return Err(ConfigError::new("quoting.momentum_decay", "must be below 1"));
        }
        if quoting.half_spread_ticks < 1 {
            return Err(ConfigError::new("quoting.half_spread_ticks", "must be at least 1"));
        }
        if quoting.variant == StrategyVariant::MultiRail {
            if quoting.inner_offset < 0 || quoting.outer_offset <= quoting.inner_offset {
                return Err(ConfigError::new(
                    "quoting.outer_offset",
                    "outer rail must sit beyond a non-negative inner rail",
                ));
            }
            if inst.outer_lot_size == 0 {
                return Err(ConfigError::new(
                    "instrument.outer_lot_size",
                    "multi-rail quoting needs an outer lot",
                ));
            }
        }

        let hedge = &self.hedge;
        if hedge.hedge_limit <= 0 {
            return Err(ConfigError::new("hedge.hedge_limit", "must be positive"));
        }
        if hedge.dead_band.is_some_and(|band| band < 0) || hedge.drift_unit == 0 {
            return Err(ConfigError::new(
                "hedge.dead_band",
                "dead band must be non-negative with a positive drift unit",
            ));
        }
        if hedge.trend_enabled && (hedge.trend_tranche == 0 || hedge.trend_slope_threshold <= 0) {
            return Err(ConfigError::new(
                "hedge.trend_tranche",
                "trend hedging needs a positive tranche and slope threshold",
            ));
        }

        Ok(())
    }
}

fn check_multiplier(field: &'static str, value: Decimal) -> Result<(), ConfigError> {
    match fixed_point::decimal_to_milli(value) {
        Some(milli) if (0..=1_000_000).contains(&milli) => Ok(()),
        _ => Err(ConfigError::new(field, "must be between 0 and 1000")),
    }
}
