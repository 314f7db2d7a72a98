//! Quoting primitives shared by every strategy
//!
//! A strategy reads a [`QuoteContext`] and answers with a [`QuoteSet`]:
//! one [`SlotIntent`] per (side, tier). The ledger turns intents into
//! gateway commands.

use crate::config::InstrumentConfig;
pub use crate::config::SizePolicy;
use crate::core::fixed_point::{floor_div_wide, MILLI};
use crate::core::{Cents, Lots, OrderId, Side, Slot, Tier};
use crate::regime::Regime;
use crate::stats::{PairSpread, Signals};

/// What a strategy wants in one slot this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotIntent {
    /// Leave whatever is there alone
    #[default]
    Hold,
    /// Rest an order at this price and size. A size of 0 keeps the slot
    /// empty without pulling an existing order at the same price.
    Quote { price: Cents, size: Lots },
    /// Cancel whatever is there
    Withdraw,
}

/// Desired state for every slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuoteSet {
    intents: [SlotIntent; Slot::COUNT],
}

impl QuoteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, slot: Slot, intent: SlotIntent) {
        self.intents[slot.index()] = intent;
    }

    pub fn quote(&mut self, slot: Slot, price: Cents, size: Lots) {
        self.set(slot, SlotIntent::Quote { price, size });
    }

    pub fn withdraw(&mut self, slot: Slot) {
        self.set(slot, SlotIntent::Withdraw);
    }

    pub fn get(&self, slot: Slot) -> SlotIntent {
        self.intents[slot.index()]
    }

    /// Intents in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Slot, SlotIntent)> + '_ {
        Slot::ALL.iter().map(|&slot| (slot, self.get(slot)))
    }

    /// Quoted price for a slot, if it carries a placeable quote
    pub fn price(&self, slot: Slot) -> Option<Cents> {
        match self.get(slot) {
            SlotIntent::Quote { price, size } if price > 0 && size > 0 => Some(price),
            _ => None,
        }
    }
}

/// Best level of the primary book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopOfBook {
    pub bid: Cents,
    pub bid_volume: Lots,
    pub ask: Cents,
    pub ask_volume: Lots,
}

/// A resting quote as the strategy sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveQuote {
    pub id: OrderId,
    pub price: Cents,
    pub remaining: Lots,
}

/// Everything a strategy may look at when quoting
#[derive(Debug, Clone, Copy)]
pub struct QuoteContext<'a> {
    pub primary: &'a Signals,
    pub hedge: Option<&'a Signals>,
    pub pair: Option<PairSpread>,
    pub book: TopOfBook,
    pub regime: Regime,
    /// Current primary position
    pub position: i64,
    /// Resting quotes by slot index
    pub live: [Option<LiveQuote>; Slot::COUNT],
    pub instrument: &'a InstrumentConfig,
}

impl QuoteContext<'_> {
    pub fn live(&self, slot: Slot) -> Option<LiveQuote> {
        self.live[slot.index()]
    }

    /// Remaining volume resting on `side`, skipping the `except` tier
    pub fn resting(&self, side: Side, except: Option<Tier>) -> Lots {
        Slot::ALL
            .iter()
            .filter(|slot| slot.side == side && Some(slot.tier) != except)
            .filter_map(|slot| self.live(*slot))
            .map(|quote| quote.remaining)
            .sum()
    }

    /// Lots an order in `slot` may carry without the side's worst case
    /// breaching the limit, after setting aside `reserve` lots for
    /// another order about to be placed on the same side
    pub fn capacity(&self, slot: Slot, reserve: Lots) -> i64 {
        position_capacity(
            slot.side,
            self.position,
            self.instrument.position_limit,
            self.resting(slot.side, Some(slot.tier)) + reserve,
        )
    }
}

/// Room left on a side: `limit - position - resting` for buys,
/// `limit + position - resting` for sells
pub fn position_capacity(side: Side, position: i64, limit: i64, resting: Lots) -> i64 {
    limit - side.sign() * position - resting as i64
}

/// `floor(-k * position * tick / limit)` with k in thousandths
///
/// Long inventory pushes both quotes down, short inventory pushes them up.
pub fn inventory_skew(position: i64, limit: i64, tick: Cents, k_milli: i64) -> Cents {
    if limit <= 0 {
        return 0;
    }
    floor_div_wide(
        -(k_milli as i128) * position as i128 * tick as i128,
        MILLI as i128 * limit as i128,
    )
}

/// Size for a tier given its capacity
pub fn size_for(policy: SizePolicy, lot: Lots, capacity: i64) -> Lots {
    if capacity <= 0 {
        return 0;
    }
    match policy {
        SizePolicy::FullLot if lot as i64 <= capacity => lot,
        SizePolicy::FullLot => 0,
        SizePolicy::Shrink => lot.min(capacity as u64),
    }
}
