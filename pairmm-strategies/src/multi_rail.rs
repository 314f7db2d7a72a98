//! Multi-Rail Quoting - inner and outer rails around the hedge mid
//!
//! Rails are placed around the hedge instrument's mid, pushed out by the
//! deviation of the primary/hedge spread:
//!
//! ```text
//!   outer_ask  = floor_tick(ref + dev + outer_offset + skew)
//!   inner_ask  = floor_tick(ref + dev + inner_offset + skew)
//!   ─────────── ref = hedge mid ───────────
//!   inner_bid  = floor_tick(ref - dev - inner_offset + skew)
//!   outer_bid  = floor_tick(ref - dev - outer_offset + skew)
//! ```
//!
//! Rails never share a price: an outer rail that lands on (or inside) its
//! inner rail is moved one tick further out. An outer rail is only offered
//! while the opposite best price has not crossed the inner rail on that
//! side; otherwise it is withdrawn.
//!
//! Sizing follows the configured policy. When both tiers on a side are
//! about to be opened, the inner tier leaves room for the outer lot.

use crate::StrategyError;
use pairmm_core::config::{EngineConfig, StrategyVariant};
use pairmm_core::core::fixed_point::floor_to_tick;
use pairmm_core::core::{Cents, EventAnomaly, Lots, Side, Slot, Tier};
use pairmm_core::engine::Strategy;
use pairmm_core::quoting::{inventory_skew, size_for, QuoteContext, QuoteSet, SizePolicy};
use tracing::{debug, trace};

/// Prices for one side, inner first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rails {
    pub inner: Cents,
    pub outer: Cents,
}

#[derive(Debug, Clone)]
pub struct MultiRail {
    skew_milli: i64,
    inner_offset: Cents,
    outer_offset: Cents,
    size_policy: SizePolicy,
    inner_lot: Lots,
    outer_lot: Lots,
}

impl MultiRail {
    pub fn from_config(config: &EngineConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        let quoting = &config.quoting;
        if quoting.variant != StrategyVariant::MultiRail {
            return Err(StrategyError::VariantMismatch {
                expected: StrategyVariant::MultiRail,
                found: quoting.variant,
            });
        }

        Ok(Self {
            skew_milli: quoting.inventory_skew_milli(),
            inner_offset: quoting.inner_offset,
            outer_offset: quoting.outer_offset,
            size_policy: quoting.size_policy,
            inner_lot: config.instrument.lot_size,
            outer_lot: config.instrument.outer_lot_size,
        })
    }

    /// Bid and ask rails around `reference`
    pub fn rails(&self, reference: Cents, deviation: Cents, skew: Cents, tick: Cents) -> (Rails, Rails) {
        let rail = |offset: Cents| floor_to_tick(reference + offset + skew, tick);

        let inner_bid = rail(-deviation - self.inner_offset);
        let mut outer_bid = rail(-deviation - self.outer_offset);
        let mut inner_ask = rail(deviation + self.inner_offset);
        let mut outer_ask = rail(deviation + self.outer_offset);

        if inner_ask <= inner_bid {
            inner_ask = inner_bid + tick;
        }
        if outer_bid >= inner_bid {
            outer_bid = inner_bid - tick;
        }
        if outer_ask <= inner_ask {
            outer_ask = inner_ask + tick;
        }

        (
            Rails {
                inner: inner_bid,
                outer: outer_bid,
            },
            Rails {
                inner: inner_ask,
                outer: outer_ask,
            },
        )
    }

    fn quote_side(&self, ctx: &QuoteContext<'_>, side: Side, rails: Rails, quotes: &mut QuoteSet) {
        let inner = Slot::new(side, Tier::Inner);
        let outer = Slot::new(side, Tier::Outer);
        let instrument = ctx.instrument;
        let in_range = |price: Cents| price >= instrument.min_bid && price <= instrument.max_ask;

        // The opposite best must not have crossed the inner rail
        let outer_allowed = in_range(rails.outer)
            && match side {
                Side::Buy => ctx.book.ask > rails.inner,
                Side::Sell => ctx.book.bid < rails.inner,
            };

        let outer_reserve = if outer_allowed && ctx.live(outer).is_none() {
            self.outer_lot
        } else {
            0
        };

        let inner_size = if in_range(rails.inner) {
            let size = size_for(self.size_policy, self.inner_lot, ctx.capacity(inner, outer_reserve));
            quotes.quote(inner, rails.inner, size);
            size
        } else {
            quotes.withdraw(inner);
            0
        };

        if outer_allowed {
            let pending_inner = if ctx.live(inner).is_none() { inner_size } else { 0 };
            let size = size_for(self.size_policy, self.outer_lot, ctx.capacity(outer, pending_inner));
            quotes.quote(outer, rails.outer, size);
        } else {
            quotes.withdraw(outer);
        }
    }
}

impl Strategy for MultiRail {
    fn quote(&mut self, ctx: &QuoteContext<'_>) -> Option<QuoteSet> {
        let (Some(hedge), Some(pair)) = (ctx.hedge, ctx.pair) else {
            let anomaly = EventAnomaly::NumericDegenerate("hedge mid or pair spread");
            debug!(%anomaly, "no quote");
            return None;
        };

        let tick = ctx.instrument.tick_size;
        let skew = inventory_skew(
            ctx.position,
            ctx.instrument.position_limit,
            tick,
            self.skew_milli,
        );
        let (bids, asks) = self.rails(hedge.mid, pair.stddev, skew, tick);

        let mut quotes = QuoteSet::new();
        self.quote_side(ctx, Side::Buy, bids, &mut quotes);
        self.quote_side(ctx, Side::Sell, asks, &mut quotes);

        trace!(
            reference = hedge.mid,
            deviation = pair.stddev,
            skew,
            inner_bid = bids.inner,
            inner_ask = asks.inner,
            "multi-rail quotes"
        );
        Some(quotes)
    }

    fn name(&self) -> &'static str {
        "MultiRail"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairmm_core::config::ConfigProfile;
    use pairmm_core::core::OrderId;
    use pairmm_core::quoting::{LiveQuote, SlotIntent, TopOfBook};
    use pairmm_core::testing::QuoteFixture;

    const INNER_BID: Slot = Slot::new(Side::Buy, Tier::Inner);
    const OUTER_BID: Slot = Slot::new(Side::Buy, Tier::Outer);
    const INNER_ASK: Slot = Slot::new(Side::Sell, Tier::Inner);
    const OUTER_ASK: Slot = Slot::new(Side::Sell, Tier::Outer);

    fn strategy() -> MultiRail {
        MultiRail::from_config(&ConfigProfile::multi_rail()).unwrap()
    }

    fn fixture(hedge_mid: Cents, deviation: Cents) -> QuoteFixture {
        let config = ConfigProfile::multi_rail();
        let mut fixture =
            QuoteFixture::new(hedge_mid, config.instrument).with_hedge(hedge_mid, deviation);
        fixture.book = TopOfBook {
            bid: hedge_mid - 100,
            bid_volume: 10,
            ask: hedge_mid + 100,
            ask_volume: 10,
        };
        fixture
    }

    #[test]
    fn test_no_quote_without_hedge() {
        let config = ConfigProfile::multi_rail();
        let fixture = QuoteFixture::new(10_000, config.instrument);
        assert!(strategy().quote(&fixture.context()).is_none());
    }

    #[test]
    fn test_rails_around_hedge_mid() {
        let (bids, asks) = strategy().rails(10_000, 150, 0, 100);

        // 10_000 - 150 - 40 = 9_810 -> 9_800; 10_000 - 150 - 100 = 9_750 -> 9_700
        assert_eq!(bids, Rails { inner: 9_800, outer: 9_700 });
        // 10_190 -> 10_100; 10_250 -> 10_200
        assert_eq!(asks, Rails { inner: 10_100, outer: 10_200 });
    }

    #[test]
    fn test_collapsed_rails_are_separated() {
        // zero deviation: both bid rails floor to 9_900
        let (bids, asks) = strategy().rails(10_000, 0, 0, 100);

        assert_eq!(asks.inner, 10_000);
        assert_eq!(asks.outer, 10_100);
        assert_eq!(bids.inner, 9_900);
        assert_eq!(bids.outer, 9_800);
    }

    #[test]
    fn test_crossed_inner_rails_widened() {
        let strat = MultiRail {
            inner_offset: 0,
            outer_offset: 10,
            ..strategy()
        };
        let (bids, asks) = strat.rails(10_050, 0, 0, 100);

        assert!(bids.inner < asks.inner);
        assert!(bids.outer < bids.inner && asks.outer > asks.inner);
    }

    #[test]
    fn test_flat_book_quotes_all_four() {
        let quotes = strategy().quote(&fixture(10_000, 150).context()).unwrap();

        // inner leaves room for the outer lot: 100 - 20 = 80 >= 10
        assert_eq!(quotes.get(INNER_BID), SlotIntent::Quote { price: 9_800, size: 10 });
        assert_eq!(quotes.get(OUTER_BID), SlotIntent::Quote { price: 9_700, size: 20 });
        assert_eq!(quotes.get(INNER_ASK), SlotIntent::Quote { price: 10_100, size: 10 });
        assert_eq!(quotes.get(OUTER_ASK), SlotIntent::Quote { price: 10_200, size: 20 });
    }

    #[test]
    fn test_outer_withdrawn_when_best_crosses_inner() {
        let mut fixture = fixture(10_000, 150);
        // best ask already at the inner bid rail
        fixture.book.ask = 9_800;
        let quotes = strategy().quote(&fixture.context()).unwrap();

        assert_eq!(quotes.get(OUTER_BID), SlotIntent::Withdraw);
        assert!(quotes.price(INNER_BID).is_some());
        assert!(quotes.price(OUTER_ASK).is_some());
    }

    #[test]
    fn test_sizes_shrink_near_limit() {
        // long 75: buy room is 25, the outer lot takes 20, the inner shrinks to 5
        let fixture = fixture(10_000, 150).with_position(75);
        let quotes = strategy().quote(&fixture.context()).unwrap();

        assert!(matches!(quotes.get(INNER_BID), SlotIntent::Quote { size: 5, .. }));
        assert!(matches!(quotes.get(OUTER_BID), SlotIntent::Quote { size: 20, .. }));
    }

    #[test]
    fn test_resting_outer_counts_against_inner() {
        let fixture = fixture(10_000, 150).with_position(60).with_live(
            OUTER_BID,
            LiveQuote {
                id: OrderId(3),
                price: 9_700,
                remaining: 20,
            },
        );
        let quotes = strategy().quote(&fixture.context()).unwrap();

        // 100 - 60 - 20 resting = 20, so the inner keeps its full lot
        assert!(matches!(quotes.get(INNER_BID), SlotIntent::Quote { size: 10, .. }));
        // outer is already resting: capacity 100 - 60 - 10 (pending inner) = 30
        assert!(matches!(quotes.get(OUTER_BID), SlotIntent::Quote { size: 20, .. }));
    }

    #[test]
    fn test_positional_skew_shifts_rails() {
        let config = ConfigProfile::multi_rail_positional();
        let mut strat = MultiRail::from_config(&config).unwrap();
        let fixture = QuoteFixture::new(10_000, config.instrument)
            .with_hedge(10_000, 0)
            .with_position(40);
        assert_eq!(inventory_skew(40, 80, 100, 800), -40);

        let quotes = strat.quote(&fixture.context()).unwrap();
        // 10_000 - 100 - 40 = 9_860 -> 9_800
        assert_eq!(quotes.price(INNER_BID), Some(9_800));
    }
}
