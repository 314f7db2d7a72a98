//! Order lifecycle through the engine: replacement, amend, reject,
//! withdrawal and unmatched execution events

mod common;

use common::{engine, Venue};
use pairmm_core::config::{ConfigProfile, EngineConfig};
use pairmm_core::core::{EventAnomaly, LedgerError, Lots, OrderId, OrderStatus, Side, Slot, Tier};
use pairmm_core::engine::{Command, Engine, EventOutcome, RecordingGateway, Strategy};
use pairmm_core::quoting::{QuoteContext, QuoteSet};
use pairmm_core::testing::{create_test_book, SequencedFeed};
use std::collections::VecDeque;

const BUY_INNER: Slot = Slot::new(Side::Buy, Tier::Inner);
const SELL_INNER: Slot = Slot::new(Side::Sell, Tier::Inner);

fn plain_single_rail() -> EngineConfig {
    let mut config = ConfigProfile::single_rail();
    config.quoting.momentum_enabled = false;
    config.quoting.trend_gain = 0;
    config
}

#[test]
fn test_reprice_cancels_before_replacing() {
    let mut engine = engine(plain_single_rail());
    let mut venue = Venue::new();
    let mut feed = SequencedFeed::new();

    feed.primary(&mut engine, 9_900, 10_100);
    venue.sync(&engine);
    let old_bid = engine.ledger().slot_order(BUY_INNER).unwrap().id();
    let old_ask = engine.ledger().slot_order(SELL_INNER).unwrap().id();

    // book moves up a tick: both quotes are stale
    let before = engine.gateway().commands().len();
    feed.primary(&mut engine, 10_000, 10_200);
    venue.sync(&engine);

    assert_eq!(
        engine.gateway().commands()[before..],
        [
            Command::Cancel { id: old_bid },
            Command::Cancel { id: old_ask }
        ]
    );
    assert!(engine.ledger().order(old_bid).unwrap().cancel_requested());

    // a second tick before the acknowledgment sends nothing new
    feed.primary(&mut engine, 10_000, 10_200);
    assert_eq!(engine.gateway().commands().len(), before + 2);

    venue.ack_cancels(&mut engine);
    assert!(engine.ledger().slot_order(BUY_INNER).is_none());
    assert_eq!(engine.ledger().open_orders(), 0);

    feed.primary(&mut engine, 10_000, 10_200);
    let inserts: Vec<(Side, i64)> = engine
        .gateway()
        .inserts()
        .skip(2)
        .map(|c| match *c {
            Command::Insert { side, price, .. } => (side, price),
            _ => unreachable!(),
        })
        .collect();
    assert_eq!(inserts, vec![(Side::Buy, 9_900), (Side::Sell, 10_300)]);
}

#[test]
fn test_rejected_quote_is_replaced_next_tick() {
    let mut engine = engine(plain_single_rail());
    let mut venue = Venue::new();
    let mut feed = SequencedFeed::new();

    feed.primary(&mut engine, 9_900, 10_100);
    venue.sync(&engine);
    let bid = engine.ledger().slot_order(BUY_INNER).unwrap().id();

    let outcome = venue.reject(&mut engine, bid);

    assert_eq!(outcome, EventOutcome::Dropped(EventAnomaly::OrderRejected(bid)));
    assert!(engine.ledger().slot_order(BUY_INNER).is_none());
    assert_eq!(engine.stats().rejects, 1);

    feed.primary(&mut engine, 9_900, 10_100);
    let replacement = engine.ledger().slot_order(BUY_INNER).unwrap();
    assert_ne!(replacement.id(), bid);
    assert_eq!(replacement.data().price, 9_800);
}

#[test]
fn test_gateway_error_without_id_changes_nothing() {
    let mut engine = engine(plain_single_rail());
    let mut feed = SequencedFeed::new();
    feed.primary(&mut engine, 9_900, 10_100);

    assert!(engine.on_error(OrderId::NONE, "session degraded").is_applied());
    assert_eq!(engine.ledger().open_orders(), 2);
    assert_eq!(engine.stats().rejects, 0);
}

#[test]
fn test_unknown_order_events_are_unmatched() {
    let mut engine = engine(plain_single_rail());
    let ghost = OrderId(77);

    assert_eq!(
        engine.on_order_filled(ghost, 10_000, 5),
        EventOutcome::Unmatched(LedgerError::UnknownOrder(ghost))
    );
    assert!(matches!(
        engine.on_order_status(ghost, 0, 0, 0),
        EventOutcome::Unmatched(_)
    ));
    assert!(matches!(
        engine.on_hedge_filled(ghost, 10_000, 5),
        EventOutcome::Unmatched(_)
    ));
    assert!(matches!(
        engine.on_error(ghost, "no such order"),
        EventOutcome::Unmatched(_)
    ));
    assert_eq!(engine.stats().unmatched, 4);
    assert_eq!(engine.position().primary, 0);
}

#[test]
fn test_hedge_report_against_quote_is_rejected() {
    let mut engine = engine(plain_single_rail());
    let mut feed = SequencedFeed::new();
    feed.primary(&mut engine, 9_900, 10_100);
    let bid = engine.ledger().slot_order(BUY_INNER).unwrap().id();

    assert_eq!(
        engine.on_hedge_filled(bid, 9_800, 10),
        EventOutcome::Unmatched(LedgerError::NotAHedge(bid))
    );
    assert_eq!(engine.position().hedge, 0);
    assert!(engine.ledger().slot_order(BUY_INNER).is_some());
}

#[test]
fn test_withdraw_all_cancels_every_quote() {
    let mut engine = engine(plain_single_rail());
    let mut venue = Venue::new();
    let mut feed = SequencedFeed::new();
    feed.primary(&mut engine, 9_900, 10_100);
    venue.sync(&engine);

    engine.withdraw_all();
    venue.sync(&engine);

    assert_eq!(engine.gateway().cancels().count(), 2);
    assert_eq!(engine.stats().cancels, 2);
    venue.ack_cancels(&mut engine);
    assert_eq!(engine.ledger().open_orders(), 0);
}

#[test]
fn test_fill_fees_and_cash_accumulate() {
    let mut engine = engine(plain_single_rail());
    let mut venue = Venue::new();
    let mut feed = SequencedFeed::new();
    feed.primary(&mut engine, 9_900, 10_100);
    venue.sync(&engine);

    let bid = engine.ledger().slot_order(BUY_INNER).unwrap().id();
    venue.fill(&mut engine, bid, 4);
    assert!(engine.on_order_status(bid, 4, 6, -3).is_applied());

    let position = engine.position();
    assert_eq!(position.primary, 4);
    assert_eq!(position.cash, -4 * 9_800);
    assert_eq!(position.fees, -3);
    assert_eq!(
        engine.ledger().order(bid).unwrap().status(),
        OrderStatus::PartiallyFilled
    );
    assert_eq!(engine.stats().fills, 1);
}

/// Quotes one fixed bid with a scripted size per tick
#[derive(Debug)]
struct ScriptedBid {
    sizes: VecDeque<Lots>,
    last: Lots,
}

impl ScriptedBid {
    fn new(sizes: &[Lots]) -> Self {
        Self {
            sizes: sizes.iter().copied().collect(),
            last: 0,
        }
    }
}

impl Strategy for ScriptedBid {
    fn quote(&mut self, _ctx: &QuoteContext<'_>) -> Option<QuoteSet> {
        if let Some(size) = self.sizes.pop_front() {
            self.last = size;
        }
        let mut quotes = QuoteSet::new();
        quotes.quote(BUY_INNER, 9_800, self.last);
        Some(quotes)
    }

    fn name(&self) -> &'static str {
        "ScriptedBid"
    }
}

#[test]
fn test_oversized_quote_amended_then_cancelled() {
    let config = ConfigProfile::multi_rail_positional();
    assert!(config.quoting.amend);
    let mut engine = Engine::new(config, ScriptedBid::new(&[20, 8, 8, 0]), RecordingGateway::new()).unwrap();
    let book = create_test_book(9_900, 10_100);
    let mut sequence = 0;
    let mut tick = |engine: &mut Engine<ScriptedBid, RecordingGateway>| {
        sequence += 1;
        engine.on_market_data(pairmm_core::core::Instrument::Primary, sequence, &book)
    };

    let _ = tick(&mut engine);
    let id = engine.ledger().slot_order(BUY_INNER).unwrap().id();
    let _ = engine.on_order_filled(id, 9_800, 5);

    // 5 filled, 15 remaining: shrink to 8 more, a total of 13
    let _ = tick(&mut engine);
    assert_eq!(
        engine.gateway().commands().last(),
        Some(&Command::Amend { id, volume: 13 })
    );
    assert_eq!(engine.stats().amends, 1);
    // the order keeps its size until the venue confirms
    assert_eq!(engine.ledger().order(id).unwrap().amend_requested(), Some(13));

    // the same amend is not sent twice
    let before = engine.gateway().commands().len();
    let _ = tick(&mut engine);
    assert_eq!(engine.gateway().commands().len(), before);

    // no room at all: pulled
    let _ = tick(&mut engine);
    assert_eq!(engine.gateway().commands().last(), Some(&Command::Cancel { id }));
}
