//! Shared fixtures for integration tests
//!
//! `Venue` plays the exchange: it reads the commands the engine sent
//! through its `RecordingGateway` and answers with execution events.

#![allow(dead_code)]

use pairmm_core::config::EngineConfig;
use pairmm_core::core::{Cents, Lots, OrderId, Side};
use pairmm_core::engine::{Command, Engine, EventOutcome, RecordingGateway};
use pairmm_strategies::AnyStrategy;
use std::collections::BTreeMap;

pub type TestEngine = Engine<AnyStrategy, RecordingGateway>;

pub fn engine(config: EngineConfig) -> TestEngine {
    let strategy = AnyStrategy::from_config(&config).unwrap();
    Engine::new(config, strategy, RecordingGateway::new()).unwrap()
}

/// An order as the venue sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VenueOrder {
    pub id: OrderId,
    pub side: Side,
    pub price: Cents,
    pub quantity: Lots,
    pub filled: Lots,
    pub hedge: bool,
    pub cancel_requested: bool,
}

impl VenueOrder {
    pub fn remaining(&self) -> Lots {
        self.quantity - self.filled
    }
}

/// Minimal exchange model answering the engine's commands
#[derive(Debug, Default)]
pub struct Venue {
    orders: BTreeMap<OrderId, VenueOrder>,
    seen: usize,
}

impl Venue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick up commands sent since the last sync
    pub fn sync(&mut self, engine: &TestEngine) {
        let commands = engine.gateway().commands();
        for command in &commands[self.seen..] {
            match *command {
                Command::Insert {
                    id,
                    side,
                    price,
                    volume,
                    ..
                } => {
                    self.orders.insert(
                        id,
                        VenueOrder {
                            id,
                            side,
                            price,
                            quantity: volume,
                            filled: 0,
                            hedge: false,
                            cancel_requested: false,
                        },
                    );
                }
                Command::Hedge {
                    id,
                    side,
                    price,
                    volume,
                } => {
                    self.orders.insert(
                        id,
                        VenueOrder {
                            id,
                            side,
                            price,
                            quantity: volume,
                            filled: 0,
                            hedge: true,
                            cancel_requested: false,
                        },
                    );
                }
                Command::Cancel { id } => {
                    if let Some(order) = self.orders.get_mut(&id) {
                        order.cancel_requested = true;
                    }
                }
                Command::Amend { id, volume } => {
                    if let Some(order) = self.orders.get_mut(&id) {
                        order.quantity = volume.max(order.filled);
                    }
                }
            }
        }
        self.seen = commands.len();
    }

    pub fn quotes(&self) -> Vec<VenueOrder> {
        self.orders.values().filter(|o| !o.hedge).copied().collect()
    }

    pub fn hedges(&self) -> Vec<VenueOrder> {
        self.orders.values().filter(|o| o.hedge).copied().collect()
    }

    /// Quote resting on `side`, newest first
    pub fn quote_on(&self, side: Side) -> Option<VenueOrder> {
        self.orders
            .values()
            .rev()
            .find(|o| !o.hedge && o.side == side)
            .copied()
    }

    /// Execute `volume` lots of a quote and report the fill
    pub fn fill(&mut self, engine: &mut TestEngine, id: OrderId, volume: Lots) -> EventOutcome {
        let Some(order) = self.orders.get_mut(&id) else {
            return engine.on_order_filled(id, 1, volume);
        };
        let volume = volume.min(order.remaining());
        order.filled += volume;
        let price = order.price;
        if order.remaining() == 0 {
            self.orders.remove(&id);
        }
        let outcome = engine.on_order_filled(id, price, volume);
        self.sync(engine);
        outcome
    }

    /// Report the order's cumulative state; acknowledges it
    pub fn ack(&mut self, engine: &mut TestEngine, id: OrderId) -> EventOutcome {
        let Some(order) = self.orders.get(&id).copied() else {
            return engine.on_order_status(id, 0, 0, 0);
        };
        let outcome = engine.on_order_status(id, order.filled, order.remaining(), 0);
        self.sync(engine);
        outcome
    }

    /// Close an order with zero remaining, as a cancel acknowledgment
    pub fn cancel_ack(&mut self, engine: &mut TestEngine, id: OrderId) -> EventOutcome {
        let filled = self.orders.remove(&id).map_or(0, |o| o.filled);
        let outcome = engine.on_order_status(id, filled, 0, 0);
        self.sync(engine);
        outcome
    }

    /// Acknowledge every cancel the engine has asked for
    pub fn ack_cancels(&mut self, engine: &mut TestEngine) {
        let pending: Vec<OrderId> = self
            .orders
            .values()
            .filter(|o| o.cancel_requested)
            .map(|o| o.id)
            .collect();
        for id in pending {
            self.cancel_ack(engine, id);
        }
    }

    /// Execute a hedge order, fully or not at all
    pub fn settle_hedge(
        &mut self,
        engine: &mut TestEngine,
        id: OrderId,
        price: Cents,
        traded: bool,
    ) -> EventOutcome {
        let volume = match self.orders.remove(&id) {
            Some(order) if traded => order.quantity,
            _ => 0,
        };
        let outcome = engine.on_hedge_filled(id, price, volume);
        self.sync(engine);
        outcome
    }

    /// Execute every outstanding hedge in full
    pub fn settle_hedges(&mut self, engine: &mut TestEngine, price: Cents) {
        let pending: Vec<OrderId> = self.hedges().iter().map(|o| o.id).collect();
        for id in pending {
            self.settle_hedge(engine, id, price, true);
        }
    }

    pub fn reject(&mut self, engine: &mut TestEngine, id: OrderId) -> EventOutcome {
        self.orders.remove(&id);
        let outcome = engine.on_error(id, "rejected by venue");
        self.sync(engine);
        outcome
    }
}
