//! Core value types shared by every component
//!
//! Everything here is `Copy` and integer-only:
//! - Prices are `i64` cents
//! - Sizes are `u64` lots
//! - Positions are signed `i64` lots

use serde::{Deserialize, Serialize};
use std::fmt;

/// Price in integer cents
pub type Cents = i64;

/// Quantity in whole lots
pub type Lots = u64;

/// Client order identifier
///
/// Issued from a single monotonically increasing counter shared by quote
/// and hedge orders, so an id is unique for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct OrderId(pub u64);

impl OrderId {
    /// The id the gateway uses for errors not bound to any order
    pub const NONE: OrderId = OrderId(0);

    #[inline(always)]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    #[inline(always)]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for OrderId {
    #[inline(always)]
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Monotonic id source. The first id handed out is 1.
#[derive(Debug, Clone)]
pub struct OrderIdSequence {
    next: u64,
}

impl OrderIdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    #[inline]
    pub fn next_id(&mut self) -> OrderId {
        let id = OrderId(self.next);
        self.next += 1;
        id
    }

    /// Id that the next call to `next_id` will return
    pub fn peek(&self) -> OrderId {
        OrderId(self.next)
    }
}

impl Default for OrderIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Buy, Side::Sell];

    /// +1 for buys, -1 for sells
    #[inline(always)]
    pub const fn sign(&self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }

    #[inline(always)]
    pub const fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Price rail an order rests on
///
/// Single-rail strategies only ever use `Inner`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tier {
    Inner = 0,
    Outer = 1,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Inner => write!(f, "inner"),
            Tier::Outer => write!(f, "outer"),
        }
    }
}

/// A (side, tier) pair. At most one live order may occupy a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub side: Side,
    pub tier: Tier,
}

impl Slot {
    pub const COUNT: usize = 4;

    /// Fixed iteration order used whenever slots are walked
    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::new(Side::Buy, Tier::Inner),
        Slot::new(Side::Buy, Tier::Outer),
        Slot::new(Side::Sell, Tier::Inner),
        Slot::new(Side::Sell, Tier::Outer),
    ];

    #[inline(always)]
    pub const fn new(side: Side, tier: Tier) -> Self {
        Self { side, tier }
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        (self.side as usize) * 2 + self.tier as usize
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.side, self.tier)
    }
}

/// Which of the two instruments an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Instrument {
    /// The product we quote (the ETF)
    Primary = 0,
    /// The correlated instrument we hedge in (the future)
    Hedge = 1,
}

impl Instrument {
    #[inline(always)]
    pub const fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instrument::Primary => write!(f, "primary"),
            Instrument::Hedge => write!(f, "hedge"),
        }
    }
}

/// Order lifespan requested on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifespan {
    /// Rests until filled, cancelled, or the session ends
    GoodForDay,
    /// Fills what it can immediately, the rest is cancelled
    FillAndKill,
}

/// Order status as seen by the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OrderStatus {
    /// Insert sent, not yet acknowledged
    Pending = 0,
    /// Acknowledged and resting, nothing filled
    Live = 1,
    /// Resting with some volume filled
    PartiallyFilled = 2,
    /// All volume filled (terminal)
    Filled = 3,
    /// Remaining volume withdrawn (terminal)
    Cancelled = 4,
    /// Gateway reported an error for the order (terminal)
    Rejected = 5,
}

impl OrderStatus {
    #[inline(always)]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled | OrderStatus::Cancelled | OrderStatus::Rejected
        )
    }

    /// Pending orders count as resting: the venue may accept them at any time.
    #[inline(always)]
    pub const fn is_resting(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Live => "Live",
            OrderStatus::PartiallyFilled => "PartiallyFilled",
            OrderStatus::Filled => "Filled",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Rejected => "Rejected",
        };
        f.write_str(name)
    }
}

/// Net holdings in both instruments plus cash accounting
///
/// Only fill events mutate a `Position`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Net signed lots of the primary instrument
    pub primary: i64,
    /// Net signed lots of the hedge instrument
    pub hedge: i64,
    /// Cash flow from all fills in cents (sells add, buys subtract)
    pub cash: i64,
    /// Cumulative fees in cents; negative means rebates received
    pub fees: i64,
    /// Number of fills applied to either instrument
    pub trade_count: u64,
}

impl Position {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a primary fill and return the new primary position
    pub fn apply_primary_fill(&mut self, side: Side, price: Cents, volume: Lots) -> i64 {
        let signed = side.sign() * volume as i64;
        self.primary += signed;
        self.cash -= signed * price;
        self.trade_count += 1;
        self.primary
    }

    /// Apply a hedge fill and return the new hedge position
    pub fn apply_hedge_fill(&mut self, side: Side, price: Cents, volume: Lots) -> i64 {
        let signed = side.sign() * volume as i64;
        self.hedge += signed;
        self.cash -= signed * price;
        self.trade_count += 1;
        self.hedge
    }

    #[inline]
    pub fn add_fees(&mut self, delta: i64) {
        self.fees += delta;
    }

    /// Combined exposure across both instruments
    #[inline(always)]
    pub fn net_exposure(&self) -> i64 {
        self.primary + self.hedge
    }

    /// Mark-to-market value in cents: cash plus holdings at the given mids, minus fees
    pub fn marked_value(&self, primary_mid: Cents, hedge_mid: Cents) -> i64 {
        self.cash + self.primary * primary_mid + self.hedge * hedge_mid - self.fees
    }
}

/// Integer helpers for cents, ticks, and milli-scaled ratios
pub mod fixed_point {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;

    /// Scale for ratios and slopes stored as integers (thousandths)
    pub const MILLI: i64 = 1_000;

    /// Basis points per unit
    pub const BPS: i64 = 10_000;

    /// Division rounding toward negative infinity. `divisor` must be positive.
    #[inline(always)]
    pub fn floor_div(value: i64, divisor: i64) -> i64 {
        value.div_euclid(divisor)
    }

    /// i128 variant of [`floor_div`], saturated back into i64
    #[inline(always)]
    pub fn floor_div_wide(value: i128, divisor: i128) -> i64 {
        let q = value.div_euclid(divisor);
        q.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Snap a price down onto the tick grid
    #[inline(always)]
    pub fn floor_to_tick(price: i64, tick: i64) -> i64 {
        floor_div(price, tick) * tick
    }

    #[inline(always)]
    pub fn is_tick_aligned(price: i64, tick: i64) -> bool {
        price.rem_euclid(tick) == 0
    }

    /// Integer square root (floor)
    pub fn isqrt(n: u128) -> u128 {
        if n < 2 {
            return n;
        }

        let mut low: u128 = 1;
        // sqrt(u128::MAX) < 2^64
        let mut high: u128 = n.min(u64::MAX as u128);

        while low <= high {
            let mid = low + (high - low) / 2;
            match mid.checked_mul(mid) {
                Some(sq) if sq == n => return mid,
                Some(sq) if sq < n => low = mid + 1,
                _ => high = mid - 1,
            }
        }

        high
    }

    /// Convert a decimal multiplier to thousandths, truncating extra precision
    ///
    /// Returns `None` when the value does not fit in an `i64`.
    pub fn decimal_to_milli(value: Decimal) -> Option<i64> {
        (value * Decimal::from(MILLI)).trunc().to_i64()
    }
}
