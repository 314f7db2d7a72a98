//! Inbound event payloads and their outcome

use crate::core::{Cents, EventAnomaly, LedgerError, Lots};
use crate::quoting::TopOfBook;

/// Levels per side in a book update
pub const BOOK_DEPTH: usize = 5;

/// Five-level snapshot of one instrument, best level first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookUpdate {
    pub ask_prices: [Cents; BOOK_DEPTH],
    pub ask_volumes: [Lots; BOOK_DEPTH],
    pub bid_prices: [Cents; BOOK_DEPTH],
    pub bid_volumes: [Lots; BOOK_DEPTH],
}

impl BookUpdate {
    /// A book with only the top level populated
    pub fn top(bid: Cents, bid_volume: Lots, ask: Cents, ask_volume: Lots) -> Self {
        let mut book = Self::default();
        book.bid_prices[0] = bid;
        book.bid_volumes[0] = bid_volume;
        book.ask_prices[0] = ask;
        book.ask_volumes[0] = ask_volume;
        book
    }

    #[inline]
    pub fn best(&self) -> TopOfBook {
        TopOfBook {
            bid: self.bid_prices[0],
            bid_volume: self.bid_volumes[0],
            ask: self.ask_prices[0],
            ask_volume: self.ask_volumes[0],
        }
    }
}

/// What the engine did with an inbound event
///
/// Nothing on the event path is fatal. A dropped event left engine state
/// as it was, apart from bookkeeping counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum EventOutcome {
    Applied,
    Dropped(EventAnomaly),
    /// An execution event the ledger could not match to a live order
    Unmatched(LedgerError),
}

impl EventOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, EventOutcome::Applied)
    }
}
