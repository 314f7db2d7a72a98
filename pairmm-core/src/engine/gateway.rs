//! Outbound order commands
//!
//! The engine never talks to a venue directly. Every order action goes
//! through a [`Gateway`], resolved at compile time like the strategy.
//! Commands are fire-and-forget: the venue answers later through the
//! engine's event callbacks.

use crate::core::{Cents, Lifespan, Lots, OrderId, Side};

/// Order transport
pub trait Gateway {
    /// Rest a limit order on the primary instrument
    fn insert_order(&mut self, id: OrderId, side: Side, price: Cents, volume: Lots, lifespan: Lifespan);

    /// Cancel a resting order
    fn cancel_order(&mut self, id: OrderId);

    /// Shrink a resting order to `volume` total lots
    fn amend_order(&mut self, id: OrderId, volume: Lots);

    /// Send a fill-and-kill order on the hedge instrument
    fn hedge_order(&mut self, id: OrderId, side: Side, price: Cents, volume: Lots);

    /// Gateway name for logging
    fn name(&self) -> &'static str;
}

/// One outbound command, as recorded by [`RecordingGateway`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Insert {
        id: OrderId,
        side: Side,
        price: Cents,
        volume: Lots,
        lifespan: Lifespan,
    },
    Cancel {
        id: OrderId,
    },
    Amend {
        id: OrderId,
        volume: Lots,
    },
    Hedge {
        id: OrderId,
        side: Side,
        price: Cents,
        volume: Lots,
    },
}

impl Command {
    pub fn id(&self) -> OrderId {
        match *self {
            Command::Insert { id, .. }
            | Command::Cancel { id }
            | Command::Amend { id, .. }
            | Command::Hedge { id, .. } => id,
        }
    }
}

/// Gateway that keeps every command in memory
///
/// Used for replay and tests. Nothing is ever executed; feed the engine
/// the venue's answers by hand.
#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    commands: Vec<Command>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, oldest first
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Take and clear the recorded commands
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn inserts(&self) -> impl Iterator<Item = &Command> + '_ {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Insert { .. }))
    }

    pub fn hedges(&self) -> impl Iterator<Item = &Command> + '_ {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Hedge { .. }))
    }

    pub fn cancels(&self) -> impl Iterator<Item = &Command> + '_ {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Cancel { .. }))
    }
}

impl Gateway for RecordingGateway {
    fn insert_order(&mut self, id: OrderId, side: Side, price: Cents, volume: Lots, lifespan: Lifespan) {
        self.commands.push(Command::Insert {
            id,
            side,
            price,
            volume,
            lifespan,
        });
    }

    fn cancel_order(&mut self, id: OrderId) {
        self.commands.push(Command::Cancel { id });
    }

    fn amend_order(&mut self, id: OrderId, volume: Lots) {
        self.commands.push(Command::Amend { id, volume });
    }

    fn hedge_order(&mut self, id: OrderId, side: Side, price: Cents, volume: Lots) {
        self.commands.push(Command::Hedge {
            id,
            side,
            price,
            volume,
        });
    }

    fn name(&self) -> &'static str {
        "RecordingGateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let mut gw = RecordingGateway::new();
        gw.insert_order(OrderId(1), Side::Buy, 9_900, 10, Lifespan::GoodForDay);
        gw.hedge_order(OrderId(2), Side::Sell, 100, 10);
        gw.cancel_order(OrderId(1));

        assert_eq!(gw.commands().len(), 3);
        assert_eq!(gw.inserts().count(), 1);
        assert_eq!(gw.hedges().count(), 1);
        assert_eq!(gw.cancels().next().map(Command::id), Some(OrderId(1)));

        let drained = gw.drain();
        assert_eq!(drained[1].id(), OrderId(2));
        assert!(gw.commands().is_empty());
    }
}
