//! Single-Rail Quoting - one bid and one ask around an anchor
//!
//! ```text
//!   center = floor_tick(anchor + skew + momentum) + floor_tick(slope * gain)
//!   bid    = center - half_spread * tick
//!   ask    = center + half_spread * tick
//! ```
//!
//! - `anchor`: VWAP or imbalance-weighted mid of the primary
//! - `skew`: `-k * position * tick / limit`, pushing quotes against inventory
//! - `momentum`: relative move of the hedge's imbalance mid in basis points,
//!   decayed and accumulated across hedge updates
//! - `slope * gain`: VWAP trend slope shift, whole ticks only
//!
//! Each side carries one lot; the outer tier is never used.

use crate::StrategyError;
use pairmm_core::config::{Anchor, EngineConfig, StrategyVariant};
use pairmm_core::core::fixed_point::{floor_div, floor_div_wide, floor_to_tick, BPS, MILLI};
use pairmm_core::core::{Cents, EventAnomaly, Lots, Side, Slot, Tier};
use pairmm_core::engine::Strategy;
use pairmm_core::quoting::{inventory_skew, size_for, QuoteContext, QuoteSet, SizePolicy};
use pairmm_core::stats::{Reversal, Signals};
use tracing::{debug, trace};

const BID: Slot = Slot::new(Side::Buy, Tier::Inner);
const ASK: Slot = Slot::new(Side::Sell, Tier::Inner);

/// Single-rail strategy state
#[derive(Debug, Clone)]
pub struct SingleRail {
    anchor: Anchor,
    skew_milli: i64,
    half_spread_ticks: i64,
    trend_gain: i64,
    momentum_enabled: bool,
    decay_milli: i64,
    reversal_gate: bool,
    size_policy: SizePolicy,
    lot: Lots,
    /// Accumulated hedge momentum in basis points
    momentum: i64,
    /// Hedge sample the momentum last consumed
    momentum_seen: Option<u64>,
}

impl SingleRail {
    pub fn from_config(config: &EngineConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let quoting = &config.quoting;
        if quoting.variant != StrategyVariant::SingleRail {
            return Err(StrategyError::VariantMismatch {
                expected: StrategyVariant::SingleRail,
                found: quoting.variant,
            });
        }

        Ok(Self {
            anchor: quoting.anchor,
            skew_milli: quoting.inventory_skew_milli(),
            half_spread_ticks: quoting.half_spread_ticks,
            trend_gain: quoting.trend_gain,
            momentum_enabled: quoting.momentum_enabled,
            decay_milli: quoting.momentum_decay_milli(),
            reversal_gate: quoting.reversal_gate,
            size_policy: quoting.size_policy,
            lot: config.instrument.lot_size,
            momentum: 0,
            momentum_seen: None,
        })
    }

    /// Current hedge momentum in basis points
    pub fn momentum(&self) -> i64 {
        self.momentum
    }

    /// Fold a new hedge sample into the momentum; repeated samples are ignored
    fn update_momentum(&mut self, hedge: Option<&Signals>) {
        if !self.momentum_enabled {
            return;
        }
        let Some(hedge) = hedge else {
            return;
        };
        if self.momentum_seen == Some(hedge.timestamp) {
            return;
        }
        self.momentum_seen = Some(hedge.timestamp);

        self.momentum = match hedge.prev_imbalance_mid {
            Some(prev) if prev > 0 => {
                let move_bps =
                    floor_div_wide((hedge.imbalance_mid - prev) as i128 * BPS as i128, prev as i128);
                move_bps + floor_div(self.momentum * self.decay_milli, MILLI)
            }
            _ => 0,
        };
    }

    /// Quote center before the half spread is applied
    fn center(&self, ctx: &QuoteContext<'_>) -> Option<Cents> {
        let tick = ctx.instrument.tick_size;
        let anchor = match self.anchor {
            Anchor::Vwap => ctx.primary.vwap,
            Anchor::ImbalanceMid => ctx.primary.imbalance_mid,
        };
        if anchor <= 0 {
            let anomaly = EventAnomaly::NumericDegenerate("single-rail anchor");
            debug!(%anomaly, "no quote");
            return None;
        }

        let skew = inventory_skew(
            ctx.position,
            ctx.instrument.position_limit,
            tick,
            self.skew_milli,
        );
        let slope_shift = floor_to_tick(
            floor_div_wide(
                ctx.primary.trend_slope as i128 * self.trend_gain as i128,
                MILLI as i128,
            ),
            tick,
        );

        Some(floor_to_tick(anchor + skew + self.momentum, tick) + slope_shift)
    }

    /// Whether a new order may open on `side` under the reversal gate
    fn gate_open(&self, side: Side, reversal: Reversal) -> bool {
        if !self.reversal_gate {
            return true;
        }
        matches!(
            (side, reversal),
            (Side::Buy, Reversal::Bid) | (Side::Sell, Reversal::Ask)
        )
    }
}

impl Strategy for SingleRail {
    fn quote(&mut self, ctx: &QuoteContext<'_>) -> Option<QuoteSet> {
        self.update_momentum(ctx.hedge);

        let tick = ctx.instrument.tick_size;
        let center = self.center(ctx)?;
        let half = self.half_spread_ticks * tick;

        let mut quotes = QuoteSet::new();
        for (slot, price) in [(BID, center - half), (ASK, center + half)] {
            let in_range = price >= ctx.instrument.min_bid && price <= ctx.instrument.max_ask;
            if !in_range {
                quotes.withdraw(slot);
                continue;
            }
            if ctx.live(slot).is_none() && !self.gate_open(slot.side, ctx.primary.reversal) {
                continue;
            }

            let size = size_for(self.size_policy, self.lot, ctx.capacity(slot, 0));
            quotes.quote(slot, price, size);
        }

        trace!(
            center,
            momentum = self.momentum,
            position = ctx.position,
            "single-rail quotes"
        );
        Some(quotes)
    }

    fn name(&self) -> &'static str {
        "SingleRail"
    }

    fn reset(&mut self) {
        self.momentum = 0;
        self.momentum_seen = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairmm_core::config::ConfigProfile;
    use pairmm_core::core::fixed_point::is_tick_aligned;
    use pairmm_core::core::OrderId;
    use pairmm_core::quoting::{LiveQuote, SlotIntent};
    use pairmm_core::testing::{create_test_signals, QuoteFixture};
    use rust_decimal_macros::dec;

    /// Single-rail profile without momentum or trend shift
    fn plain_config() -> EngineConfig {
        let mut config = ConfigProfile::single_rail();
        config.quoting.momentum_enabled = false;
        config.quoting.trend_gain = 0;
        config
    }

    fn strategy(config: &EngineConfig) -> SingleRail {
        SingleRail::from_config(config).unwrap()
    }

    #[test]
    fn test_rejects_multi_rail_config() {
        let err = SingleRail::from_config(&ConfigProfile::multi_rail()).unwrap_err();
        assert!(matches!(err, StrategyError::VariantMismatch { .. }));
    }

    #[test]
    fn test_flat_position_quotes_symmetric() {
        let config = plain_config();
        let fixture = QuoteFixture::new(10_050, config.instrument.clone());
        let quotes = strategy(&config).quote(&fixture.context()).unwrap();

        // center floor_tick(10_050) = 10_000, two ticks each way
        assert_eq!(quotes.get(BID), SlotIntent::Quote { price: 9_800, size: 10 });
        assert_eq!(quotes.get(ASK), SlotIntent::Quote { price: 10_200, size: 10 });
        assert_eq!(quotes.get(Slot::new(Side::Buy, Tier::Outer)), SlotIntent::Hold);
    }

    #[test]
    fn test_long_position_lowers_quotes() {
        let config = plain_config();
        let fixture = QuoteFixture::new(10_000, config.instrument.clone()).with_position(50);
        let quotes = strategy(&config).quote(&fixture.context()).unwrap();

        // skew -35 cents: floor_tick(9_965) = 9_900
        assert_eq!(quotes.price(BID), Some(9_700));
        assert_eq!(quotes.price(ASK), Some(10_100));
    }

    #[test]
    fn test_position_near_limit_suppresses_buy() {
        // position +90, limit 100, lot 20: the buy lot cannot fit
        let mut config = plain_config();
        config.instrument.lot_size = 20;
        let fixture = QuoteFixture::new(10_000, config.instrument.clone()).with_position(90);
        let quotes = strategy(&config).quote(&fixture.context()).unwrap();

        assert_eq!(quotes.price(BID), None);
        assert!(matches!(quotes.get(ASK), SlotIntent::Quote { size: 20, .. }));
    }

    #[test]
    fn test_trend_slope_shifts_whole_ticks() {
        let config = ConfigProfile::single_rail();
        let mut fixture = QuoteFixture::new(10_000, config.instrument.clone());
        // 1.5 cents per tick * 100 = 150 cents, floored to 100
        fixture.primary.trend_slope = 1_500;
        let mut strat = strategy(&config);
        let quotes = strat.quote(&fixture.context()).unwrap();

        assert_eq!(quotes.price(BID), Some(9_900));
        assert_eq!(quotes.price(ASK), Some(10_300));
    }

    #[test]
    fn test_hedge_momentum_accumulates_once_per_sample() {
        let mut config = ConfigProfile::single_rail();
        config.quoting.trend_gain = 0;
        config.quoting.momentum_decay = dec!(0.5);
        let mut strat = strategy(&config);

        let mut fixture = QuoteFixture::new(10_000, config.instrument.clone());
        let mut hedge = create_test_signals(10_100);
        hedge.timestamp = 2;
        hedge.prev_imbalance_mid = Some(10_000);
        fixture.hedge = Some(hedge);

        // +100 on 10_000 = 100 bps
        strat.quote(&fixture.context());
        assert_eq!(strat.momentum(), 100);

        // same hedge sample, no change
        strat.quote(&fixture.context());
        assert_eq!(strat.momentum(), 100);

        // flat next sample: decayed by half
        hedge.timestamp = 3;
        hedge.prev_imbalance_mid = Some(10_100);
        fixture.hedge = Some(hedge);
        strat.quote(&fixture.context());
        assert_eq!(strat.momentum(), 50);

        strat.reset();
        assert_eq!(strat.momentum(), 0);
    }

    #[test]
    fn test_momentum_resets_without_previous_sample() {
        let mut strat = strategy(&ConfigProfile::single_rail());
        strat.momentum = 40;
        let mut hedge = create_test_signals(10_000);
        hedge.timestamp = 9;

        strat.update_momentum(Some(&hedge));
        assert_eq!(strat.momentum(), 0);
    }

    #[test]
    fn test_reversal_gate_blocks_new_orders_only() {
        let mut config = plain_config();
        config.quoting.reversal_gate = true;
        let mut strat = strategy(&config);

        let mut fixture = QuoteFixture::new(10_000, config.instrument.clone());
        fixture.primary.reversal = Reversal::Bid;
        let quotes = strat.quote(&fixture.context()).unwrap();
        assert_eq!(quotes.price(BID), Some(9_800));
        assert_eq!(quotes.get(ASK), SlotIntent::Hold);

        // a resting ask is still repriced
        let fixture = fixture.with_live(
            ASK,
            LiveQuote {
                id: OrderId(7),
                price: 10_300,
                remaining: 10,
            },
        );
        let quotes = strat.quote(&fixture.context()).unwrap();
        assert_eq!(quotes.price(ASK), Some(10_200));
    }

    #[test]
    fn test_prices_on_grid_and_ordered() {
        let config = ConfigProfile::single_rail();
        let mut strat = strategy(&config);
        for (mid, position, slope) in [(10_037, 13, 220), (55_555, -71, -4_000), (120, 99, 0)] {
            let mut fixture =
                QuoteFixture::new(mid, config.instrument.clone()).with_position(position);
            fixture.primary.trend_slope = slope;
            let quotes = strat.quote(&fixture.context()).unwrap();

            if let (Some(bid), Some(ask)) = (quotes.price(BID), quotes.price(ASK)) {
                assert!(bid < ask);
                assert!(is_tick_aligned(bid, 100) && is_tick_aligned(ask, 100));
            }
        }
    }

    #[test]
    fn test_out_of_range_bid_withdrawn() {
        let config = plain_config();
        let fixture = QuoteFixture::new(150, config.instrument.clone());
        let quotes = strategy(&config).quote(&fixture.context()).unwrap();

        // center 100, bid would be -100
        assert_eq!(quotes.get(BID), SlotIntent::Withdraw);
        assert_eq!(quotes.price(ASK), Some(300));
    }
}
