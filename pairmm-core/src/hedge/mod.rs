//! Offsetting orders on the hedge instrument
//!
//! Three triggers, each sending a marketable fill-and-kill order through
//! the ledger:
//!
//! - **Per fill** (Normal regime): every primary fill is offset 1:1 in the
//!   opposite direction.
//! - **Drift** (Normal regime, dead band configured): when primary plus
//!   hedge plus in-flight hedge volume sits outside the dead band, one
//!   unit is sent towards flat. At most one per event.
//! - **Tranche** (Trending regime): a long projected hedge position is
//!   sold down by a tranche while the primary mid slope is steeply
//!   negative, and a short one bought back while it is steeply positive,
//!   as long as the result stays inside the hedge limit.
//!
//! Hedges take liquidity: sells go one tick above the venue minimum, buys
//! at the venue maximum, both on the tick grid.

use crate::config::{HedgeConfig, InstrumentConfig};
use crate::core::fixed_point::{floor_to_tick, MILLI};
use crate::core::{Cents, Lots, OrderId, Side};
use crate::engine::Gateway;
use crate::ledger::{FillEvent, OrderLedger};
use crate::regime::Regime;
use tracing::debug;

/// Why a hedge was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HedgeReason {
    Fill,
    Drift,
    Tranche,
}

/// A hedge order just sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HedgeIntent {
    pub id: OrderId,
    pub side: Side,
    pub price: Cents,
    pub volume: Lots,
    pub reason: HedgeReason,
}

#[derive(Debug, Clone)]
pub struct HedgeController {
    config: HedgeConfig,
    sell_price: Cents,
    buy_price: Cents,
}

impl HedgeController {
    pub fn new(config: &HedgeConfig, instrument: &InstrumentConfig) -> Self {
        let tick = instrument.tick_size;
        Self {
            config: config.clone(),
            sell_price: floor_to_tick(instrument.min_bid + tick, tick),
            buy_price: floor_to_tick(instrument.max_ask, tick),
        }
    }

    /// Marketable limit price for a hedge in `side`
    pub fn marketable_price(&self, side: Side) -> Cents {
        match side {
            Side::Buy => self.buy_price,
            Side::Sell => self.sell_price,
        }
    }

    /// Offset a primary fill 1:1
    ///
    /// Suppressed while Trending; tranches take over.
    pub fn on_primary_fill<G: Gateway>(
        &self,
        fill: &FillEvent,
        regime: Regime,
        ledger: &mut OrderLedger,
        gateway: &mut G,
    ) -> Option<HedgeIntent> {
        if !self.config.on_fill || fill.volume == 0 {
            return None;
        }
        if regime == Regime::Trending {
            debug!(id = %fill.id, volume = fill.volume, "per-fill hedge suppressed while trending");
            return None;
        }
        Some(self.send(fill.side.opposite(), fill.volume, HedgeReason::Fill, ledger, gateway))
    }

    /// Drift and tranche checks, run once per accepted book update
    pub fn on_tick<G: Gateway>(
        &self,
        regime: Regime,
        price_slope: i64,
        ledger: &mut OrderLedger,
        gateway: &mut G,
    ) -> Option<HedgeIntent> {
        match regime {
            Regime::Normal => self.drift(ledger, gateway),
            Regime::Trending => self.tranche(price_slope, ledger, gateway),
        }
    }

    fn drift<G: Gateway>(&self, ledger: &mut OrderLedger, gateway: &mut G) -> Option<HedgeIntent> {
        let band = self.config.dead_band?;
        let position = ledger.position();
        let exposure = position.primary + position.hedge + ledger.hedge_in_flight();

        let side = if exposure > band {
            Side::Sell
        } else if exposure < -band {
            Side::Buy
        } else {
            return None;
        };

        debug!(exposure, band, %side, "exposure outside dead band");
        Some(self.send(side, self.config.drift_unit, HedgeReason::Drift, ledger, gateway))
    }

    fn tranche<G: Gateway>(
        &self,
        price_slope: i64,
        ledger: &mut OrderLedger,
        gateway: &mut G,
    ) -> Option<HedgeIntent> {
        if !self.config.trend_enabled {
            return None;
        }

        let projected = ledger.position().hedge + ledger.hedge_in_flight();
        let tranche = self.config.trend_tranche as i64;
        let threshold = self.config.trend_slope_threshold * MILLI;
        let limit = self.config.hedge_limit;

        let side = if projected > 0 && price_slope < -threshold && projected - tranche >= -limit {
            Side::Sell
        } else if projected < 0 && price_slope > threshold && projected + tranche <= limit {
            Side::Buy
        } else {
            return None;
        };

        debug!(projected, price_slope, %side, "trend tranche");
        Some(self.send(side, self.config.trend_tranche, HedgeReason::Tranche, ledger, gateway))
    }

    fn send<G: Gateway>(
        &self,
        side: Side,
        volume: Lots,
        reason: HedgeReason,
        ledger: &mut OrderLedger,
        gateway: &mut G,
    ) -> HedgeIntent {
        let price = self.marketable_price(side);
        let id = ledger.insert_hedge(side, price, volume, gateway);
        HedgeIntent {
            id,
            side,
            price,
            volume,
            reason,
        }
    }
}
