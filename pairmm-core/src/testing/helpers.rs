//! Test helper utilities for creating test data
//!
//! Provides convenient builders for:
//! - Book updates
//! - Sequenced event feeds into an engine
//! - Quote contexts for driving a strategy directly

use crate::config::InstrumentConfig;
use crate::core::{Cents, Instrument, Lots, Slot};
use crate::engine::{BookUpdate, Engine, EventOutcome, Gateway, Strategy};
use crate::quoting::{LiveQuote, QuoteContext, TopOfBook};
use crate::regime::Regime;
use crate::stats::{PairSpread, Reversal, Signals};

/// Top-of-book update with 10 lots on each side
pub fn create_test_book(bid: Cents, ask: Cents) -> BookUpdate {
    BookUpdate::top(bid, 10, ask, 10)
}

/// Top-of-book update with explicit volumes
pub fn create_test_book_with_volume(
    bid: Cents,
    bid_volume: Lots,
    ask: Cents,
    ask_volume: Lots,
) -> BookUpdate {
    BookUpdate::top(bid, bid_volume, ask, ask_volume)
}

/// Feeds books into an engine with increasing sequence numbers per instrument
#[derive(Debug, Clone, Default)]
pub struct SequencedFeed {
    sequence: [u64; 2],
}

impl SequencedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send<S: Strategy, G: Gateway>(
        &mut self,
        engine: &mut Engine<S, G>,
        instrument: Instrument,
        book: &BookUpdate,
    ) -> EventOutcome {
        self.sequence[instrument.index()] += 1;
        engine.on_market_data(instrument, self.sequence[instrument.index()], book)
    }

    pub fn primary<S: Strategy, G: Gateway>(
        &mut self,
        engine: &mut Engine<S, G>,
        bid: Cents,
        ask: Cents,
    ) -> EventOutcome {
        self.send(engine, Instrument::Primary, &create_test_book(bid, ask))
    }

    pub fn hedge<S: Strategy, G: Gateway>(
        &mut self,
        engine: &mut Engine<S, G>,
        bid: Cents,
        ask: Cents,
    ) -> EventOutcome {
        self.send(engine, Instrument::Hedge, &create_test_book(bid, ask))
    }

    /// Last sequence number sent for an instrument
    pub fn last(&self, instrument: Instrument) -> u64 {
        self.sequence[instrument.index()]
    }
}

/// Flat signals: every price statistic equal to `mid`
pub fn create_test_signals(mid: Cents) -> Signals {
    Signals {
        timestamp: 1,
        mid,
        imbalance_mid: mid,
        prev_imbalance_mid: None,
        vwap: mid,
        upper_band: mid,
        lower_band: mid,
        trend_slope: 0,
        price_slope: 0,
        price_average: None,
        reversal: Reversal::None,
        samples: 1,
    }
}

/// Owns everything a [`QuoteContext`] borrows
#[derive(Debug, Clone)]
pub struct QuoteFixture {
    pub primary: Signals,
    pub hedge: Option<Signals>,
    pub pair: Option<PairSpread>,
    pub book: TopOfBook,
    pub regime: Regime,
    pub position: i64,
    pub live: [Option<LiveQuote>; Slot::COUNT],
    pub instrument: InstrumentConfig,
}

impl QuoteFixture {
    /// Primary at `mid`, book one tick either side, no hedge data
    pub fn new(mid: Cents, instrument: InstrumentConfig) -> Self {
        let tick = instrument.tick_size;
        Self {
            primary: create_test_signals(mid),
            hedge: None,
            pair: None,
            book: TopOfBook {
                bid: mid - tick,
                bid_volume: 10,
                ask: mid + tick,
                ask_volume: 10,
            },
            regime: Regime::Normal,
            position: 0,
            live: [None; Slot::COUNT],
            instrument,
        }
    }

    pub fn with_position(mut self, position: i64) -> Self {
        self.position = position;
        self
    }

    /// Hedge instrument at `mid` with the given pair spread deviation
    pub fn with_hedge(mut self, mid: Cents, stddev: Cents) -> Self {
        self.hedge = Some(create_test_signals(mid));
        self.pair = Some(PairSpread {
            spread: self.primary.mid - mid,
            stddev,
            observations: 2,
        });
        self
    }

    pub fn with_live(mut self, slot: Slot, quote: LiveQuote) -> Self {
        self.live[slot.index()] = Some(quote);
        self
    }

    pub fn context(&self) -> QuoteContext<'_> {
        QuoteContext {
            primary: &self.primary,
            hedge: self.hedge.as_ref(),
            pair: self.pair,
            book: self.book,
            regime: self.regime,
            position: self.position,
            live: self.live,
            instrument: &self.instrument,
        }
    }
}
