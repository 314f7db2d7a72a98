//! Generic decision engine
//!
//! One engine instance owns every piece of mutable state: rolling
//! statistics, the regime detector, the order ledger and the hedge
//! controller. The strategy and the gateway are type parameters, so all
//! dispatch is resolved at compile time.
//!
//! ## Event Pipeline
//!
//! ```text
//!   on_market_data(instrument, sequence, book)
//!              │
//!              ▼
//!   ┌─────────────────────┐  sequence <= last
//!   │  Sequence check     │ ─────────────────────▶ Dropped(StaleSequence)
//!   └─────────────────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐  zero volume / empty side
//!   │ StatisticsEngine    │ ─────────────────────▶ Dropped(DegenerateMarket)
//!   └─────────────────────┘
//!              │ Signals
//!              ▼
//!   ┌─────────────────────┐
//!   │ RegimeDetector      │  Normal / Trending
//!   └─────────────────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │ HedgeController     │  drift or tranche hedge
//!   └─────────────────────┘
//!              │ primary only
//!              ▼
//!   ┌─────────────────────┐        ┌─────────────────────┐
//!   │ Strategy::quote()   │ ─────▶ │ OrderLedger         │ ──▶ Gateway
//!   └─────────────────────┘QuoteSet│ reconcile()         │
//!                                  └─────────────────────┘
//! ```
//!
//! Execution events (`on_order_filled`, `on_order_status`,
//! `on_hedge_filled`, `on_error`) update the ledger. A primary fill may send
//! its own offset hedge; drift and tranche checks wait for the next book.
//! Every callback returns an [`EventOutcome`]; none of them can fail.

use super::events::{BookUpdate, EventOutcome};
use super::gateway::Gateway;
use crate::config::{ConfigError, EngineConfig};
use crate::core::{Cents, EventAnomaly, Instrument, LedgerError, Lots, OrderId, Position, Slot};
use crate::hedge::{HedgeController, HedgeIntent};
use crate::ledger::{FillEvent, OrderLedger};
use crate::quoting::{QuoteContext, QuoteSet, SlotIntent};
use crate::regime::{Regime, RegimeDetector};
use crate::stats::StatisticsEngine;
use tracing::{debug, info, trace, warn};

/// Quoting logic, resolved at compile time
pub trait Strategy {
    /// Desired quotes for this tick
    ///
    /// `None` means the inputs were not usable; resting quotes are left
    /// as they are.
    fn quote(&mut self, ctx: &QuoteContext<'_>) -> Option<QuoteSet>;

    /// Strategy name for logging
    fn name(&self) -> &'static str;

    /// Reset strategy state (called at start of day, etc.)
    fn reset(&mut self) {}
}

/// Engine counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub market_events: u64,
    pub trade_ticks: u64,
    pub dropped_stale: u64,
    pub dropped_degenerate: u64,
    /// Primary ticks on which the strategy produced nothing
    pub quotes_skipped: u64,
    pub quotes_inserted: u64,
    pub cancels: u64,
    pub amends: u64,
    pub suppressed: u64,
    pub fills: u64,
    pub hedges_sent: u64,
    pub hedge_fills: u64,
    pub rejects: u64,
    pub unmatched: u64,
}

/// Market-making engine over a strategy `S` and a gateway `G`
pub struct Engine<S: Strategy, G: Gateway> {
    config: EngineConfig,
    strategy: S,
    gateway: G,
    statistics: StatisticsEngine,
    regime: RegimeDetector,
    ledger: OrderLedger,
    hedger: HedgeController,
    last_sequence: [Option<u64>; 2],
    last_trade_sequence: [Option<u64>; 2],
    /// Accepted market-data events per instrument; each instrument's
    /// statistics run on its own clock
    ticks: [u64; 2],
    book: [Option<BookUpdate>; 2],
    stats: EngineStats,
}

impl<S: Strategy, G: Gateway> Engine<S, G> {
    /// Create an engine; the configuration is validated first
    pub fn new(config: EngineConfig, strategy: S, gateway: G) -> Result<Self, ConfigError> {
        config.validate()?;
        info!("Initializing engine: {} + {}", strategy.name(), gateway.name());

        Ok(Self {
            statistics: StatisticsEngine::new(&config.statistics),
            regime: RegimeDetector::new(&config.regime),
            ledger: OrderLedger::new(config.instrument.position_limit, config.quoting.amend),
            hedger: HedgeController::new(&config.hedge, &config.instrument),
            last_sequence: [None; 2],
            last_trade_sequence: [None; 2],
            ticks: [0; 2],
            book: [None; 2],
            stats: EngineStats::default(),
            config,
            strategy,
            gateway,
        })
    }

    // ========================================================================
    // Inbound events
    // ========================================================================

    /// Order book snapshot for either instrument
    pub fn on_market_data(
        &mut self,
        instrument: Instrument,
        sequence: u64,
        book: &BookUpdate,
    ) -> EventOutcome {
        if let Some(anomaly) = Self::check_sequence(&mut self.last_sequence, instrument, sequence) {
            debug!(%anomaly, "market data dropped");
            self.stats.dropped_stale += 1;
            return EventOutcome::Dropped(anomaly);
        }
        self.stats.market_events += 1;

        let top = book.best();
        let tick = self.ticks[instrument.index()] + 1;
        let Some(signals) = self.statistics.observe(
            instrument,
            tick,
            top.bid,
            top.bid_volume,
            top.ask,
            top.ask_volume,
        ) else {
            let anomaly = EventAnomaly::DegenerateMarket { instrument };
            debug!(%anomaly, sequence, "signals kept");
            self.stats.dropped_degenerate += 1;
            return EventOutcome::Dropped(anomaly);
        };
        self.ticks[instrument.index()] = tick;
        self.book[instrument.index()] = Some(*book);

        let regime = self
            .regime
            .update(instrument, signals.mid, self.ledger.position().primary);
        self.rebalance(regime);

        if instrument == Instrument::Primary {
            self.requote(regime);
        }

        EventOutcome::Applied
    }

    /// Trade prints; counted, no state change
    pub fn on_trade_ticks(
        &mut self,
        instrument: Instrument,
        sequence: u64,
        _book: &BookUpdate,
    ) -> EventOutcome {
        if let Some(anomaly) =
            Self::check_sequence(&mut self.last_trade_sequence, instrument, sequence)
        {
            trace!(%anomaly, "trade ticks dropped");
            return EventOutcome::Dropped(anomaly);
        }
        self.stats.trade_ticks += 1;
        EventOutcome::Applied
    }

    /// Execution report for a resting quote
    pub fn on_order_filled(&mut self, id: OrderId, price: Cents, volume: Lots) -> EventOutcome {
        match self.ledger.on_order_filled(id, price, volume) {
            Ok(fill) => {
                if let Some(fill) = fill {
                    self.after_fill(&fill);
                }
                EventOutcome::Applied
            }
            Err(err) => self.unmatched(err),
        }
    }

    /// Cumulative status for a resting quote
    pub fn on_order_status(
        &mut self,
        id: OrderId,
        fill_volume: Lots,
        remaining: Lots,
        fees: i64,
    ) -> EventOutcome {
        match self.ledger.on_order_status(id, fill_volume, remaining, fees) {
            Ok(outcome) => {
                trace!(%id, status = %outcome.status, fill_volume, remaining, fees, "order status");
                if let Some(fill) = outcome.fill {
                    self.after_fill(&fill);
                }
                EventOutcome::Applied
            }
            Err(err) => self.unmatched(err),
        }
    }

    /// Execution report closing a hedge order
    pub fn on_hedge_filled(&mut self, id: OrderId, average_price: Cents, volume: Lots) -> EventOutcome {
        match self.ledger.on_hedge_filled(id, average_price, volume) {
            Ok(fill) => {
                if fill.volume == 0 {
                    warn!(%id, "hedge did not trade");
                } else {
                    info!(
                        %id,
                        side = %fill.side,
                        price = average_price,
                        volume = fill.volume,
                        hedge_position = fill.hedge_position,
                        "hedge filled"
                    );
                    self.stats.hedge_fills += 1;
                }
                EventOutcome::Applied
            }
            Err(err) => self.unmatched(err),
        }
    }

    /// Gateway error; a non-zero id frees that order's slot
    pub fn on_error(&mut self, id: OrderId, message: &str) -> EventOutcome {
        if id.is_none() {
            warn!(reason = message, "gateway error");
            return EventOutcome::Applied;
        }

        match self.ledger.on_error(id) {
            Ok(data) => {
                let anomaly = EventAnomaly::OrderRejected(id);
                warn!(%anomaly, side = %data.side, price = data.price, reason = message, "order rejected");
                self.stats.rejects += 1;
                EventOutcome::Dropped(anomaly)
            }
            Err(err) => {
                warn!(%id, reason = message, "gateway error for unknown order");
                self.unmatched(err)
            }
        }
    }

    /// Cancel every resting quote, e.g. before shutdown
    pub fn withdraw_all(&mut self) {
        let mut quotes = QuoteSet::new();
        for slot in Slot::ALL {
            quotes.set(slot, SlotIntent::Withdraw);
        }
        let report = self.ledger.reconcile(&quotes, &mut self.gateway);
        self.stats.cancels += report.cancelled as u64;
        info!(cancelled = report.cancelled, "withdrew all quotes");
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn check_sequence(
        last: &mut [Option<u64>; 2],
        instrument: Instrument,
        sequence: u64,
    ) -> Option<EventAnomaly> {
        let slot = &mut last[instrument.index()];
        match *slot {
            Some(previous) if sequence <= previous => Some(EventAnomaly::StaleSequence {
                instrument,
                sequence,
                last: previous,
            }),
            _ => {
                *slot = Some(sequence);
                None
            }
        }
    }

    fn requote(&mut self, regime: Regime) {
        let Some(primary) = self.statistics.signals(Instrument::Primary) else {
            return;
        };
        let Some(book) = self.book[Instrument::Primary.index()] else {
            return;
        };

        let ctx = QuoteContext {
            primary,
            hedge: self.statistics.signals(Instrument::Hedge),
            pair: self.statistics.pair_spread(),
            book: book.best(),
            regime,
            position: self.ledger.position().primary,
            live: self.ledger.live_quotes(),
            instrument: &self.config.instrument,
        };

        let Some(quotes) = self.strategy.quote(&ctx) else {
            self.stats.quotes_skipped += 1;
            return;
        };

        let report = self.ledger.reconcile(&quotes, &mut self.gateway);
        self.stats.quotes_inserted += report.inserted as u64;
        self.stats.cancels += report.cancelled as u64;
        self.stats.amends += report.amended as u64;
        self.stats.suppressed += report.suppressed as u64;

        if report.inserted > 0 {
            self.statistics.clear_reversal(Instrument::Primary);
        }
    }

    fn after_fill(&mut self, fill: &FillEvent) {
        self.stats.fills += 1;
        let regime = self.regime.regime();
        if let Some(hedge) = self
            .hedger
            .on_primary_fill(fill, regime, &mut self.ledger, &mut self.gateway)
        {
            self.hedge_sent(&hedge);
        }
    }

    fn rebalance(&mut self, regime: Regime) {
        let price_slope = self
            .statistics
            .signals(Instrument::Primary)
            .map_or(0, |s| s.price_slope);
        if let Some(hedge) =
            self.hedger
                .on_tick(regime, price_slope, &mut self.ledger, &mut self.gateway)
        {
            self.hedge_sent(&hedge);
        }
    }

    fn hedge_sent(&mut self, hedge: &HedgeIntent) {
        self.stats.hedges_sent += 1;
        debug!(id = %hedge.id, reason = ?hedge.reason, "hedge sent");
    }

    fn unmatched(&mut self, err: LedgerError) -> EventOutcome {
        debug!(error = %err, "execution event not applied");
        self.stats.unmatched += 1;
        EventOutcome::Unmatched(err)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn position(&self) -> &Position {
        self.ledger.position()
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    pub fn statistics(&self) -> &StatisticsEngine {
        &self.statistics
    }

    pub fn regime(&self) -> Regime {
        self.regime.regime()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// Reset the strategy (called at start of day, etc.)
    pub fn reset_strategy(&mut self) {
        info!(strategy = self.strategy.name(), "strategy reset");
        self.strategy.reset();
    }
}
