//! Order ledger: one map from id to order record, plus the slot index
//!
//! The ledger owns every order the engine has sent and the position they
//! produced. Each tick it diffs the strategy's [`QuoteSet`] against the
//! resting quotes:
//!
//! 1. Cancels first. A resting quote whose price no longer matches a
//!    non-zero desired price, or whose slot is withdrawn, gets exactly one
//!    cancel. The slot stays occupied until the gateway reports zero
//!    remaining volume.
//! 2. Amends, when enabled: same price but a smaller desired size shrinks
//!    the order in place.
//! 3. Inserts into empty slots, provided the side's worst case (position
//!    plus everything resting on that side plus the new order) stays
//!    inside the limit.
//!
//! Hedge orders live in the same map, tagged [`OrderKind::Hedge`], so a
//! fill can never be attributed to the wrong instrument.

use crate::core::{
    Cents, EventAnomaly, LedgerError, Lifespan, Lots, OrderData, OrderId, OrderIdSequence,
    OrderKind, OrderStatus, Position, Side, Slot, Tier, TrackedOrder,
};
use crate::engine::Gateway;
use crate::quoting::{position_capacity, LiveQuote, QuoteSet, SlotIntent};
use std::collections::HashMap;
use tracing::{debug, info};

/// A primary fill credited to the position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillEvent {
    pub id: OrderId,
    pub side: Side,
    pub tier: Tier,
    pub price: Cents,
    pub volume: Lots,
    /// Primary position after the fill
    pub position: i64,
}

/// A hedge execution report applied to the hedge position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HedgeFill {
    pub id: OrderId,
    pub side: Side,
    pub price: Cents,
    /// Zero when the hedge did not trade at all
    pub volume: Lots,
    pub hedge_position: i64,
}

/// Result of a status report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOutcome {
    pub status: OrderStatus,
    /// Fill volume first learned from this report
    pub fill: Option<FillEvent>,
}

/// What one reconcile pass sent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inserted: u32,
    pub cancelled: u32,
    pub amended: u32,
    /// Quotes held back by the position limit
    pub suppressed: u32,
}

/// Orders, slots and position
#[derive(Debug, Clone)]
pub struct OrderLedger {
    orders: HashMap<OrderId, TrackedOrder>,
    slots: [Option<OrderId>; Slot::COUNT],
    ids: OrderIdSequence,
    position: Position,
    position_limit: i64,
    amend: bool,
}

impl OrderLedger {
    pub fn new(position_limit: i64, amend: bool) -> Self {
        Self {
            orders: HashMap::new(),
            slots: [None; Slot::COUNT],
            ids: OrderIdSequence::new(),
            position: Position::new(),
            position_limit,
            amend,
        }
    }

    // ========================================================================
    // Quote reconciliation
    // ========================================================================

    /// Bring resting quotes in line with `quotes`
    pub fn reconcile<G: Gateway>(&mut self, quotes: &QuoteSet, gateway: &mut G) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for (slot, intent) in quotes.iter() {
            let Some(id) = self.slots[slot.index()] else {
                continue;
            };
            let Some(order) = self.orders.get_mut(&id) else {
                self.slots[slot.index()] = None;
                continue;
            };

            let live_price = order.data().price;
            let cancel = match intent {
                SlotIntent::Hold => false,
                SlotIntent::Withdraw => true,
                SlotIntent::Quote { price, .. } if price != 0 && price != live_price => true,
                SlotIntent::Quote { size, .. } if self.amend && size < order.remaining() => {
                    if size == 0 {
                        true
                    } else {
                        let total = order.filled() + size;
                        if order.request_amend(total) {
                            info!(%id, %slot, from = order.quantity(), to = total, "amend");
                            gateway.amend_order(id, total);
                            report.amended += 1;
                        }
                        false
                    }
                }
                SlotIntent::Quote { .. } => false,
            };

            if cancel && order.request_cancel() {
                info!(%id, %slot, price = live_price, "cancel");
                gateway.cancel_order(id);
                report.cancelled += 1;
            }
        }

        for (slot, intent) in quotes.iter() {
            if self.slots[slot.index()].is_some() {
                continue;
            }
            let SlotIntent::Quote { price, size } = intent else {
                continue;
            };
            if price <= 0 || size == 0 {
                continue;
            }

            let resting = self.resting(slot.side);
            if position_capacity(slot.side, self.position.primary, self.position_limit, resting)
                < size as i64
            {
                let anomaly = EventAnomaly::PositionLimitBreach {
                    slot,
                    size,
                    position: self.position.primary,
                    limit: self.position_limit,
                };
                debug!(%anomaly, resting, "quote suppressed");
                report.suppressed += 1;
                continue;
            }

            let id = self.ids.next_id();
            let data = OrderData {
                id,
                side: slot.side,
                kind: OrderKind::Quote(slot.tier),
                price,
            };
            self.orders.insert(id, TrackedOrder::pending(data, size));
            self.slots[slot.index()] = Some(id);

            info!(%id, %slot, price, size, "insert");
            gateway.insert_order(id, slot.side, price, size, Lifespan::GoodForDay);
            report.inserted += 1;
        }

        report
    }

    // ========================================================================
    // Quote execution events
    // ========================================================================

    /// Apply an execution report for a quote
    ///
    /// Returns `Ok(None)` when a status report already credited this volume.
    pub fn on_order_filled(
        &mut self,
        id: OrderId,
        price: Cents,
        volume: Lots,
    ) -> Result<Option<FillEvent>, LedgerError> {
        let order = self.quote_mut(id)?;
        let credited = order
            .apply_fill(volume, price)
            .map_err(|source| LedgerError::InvalidFill { id, source })?;
        let data = *order.data();
        let terminal = order.is_terminal();

        let fill = self.credit(&data, price, credited);
        if terminal {
            self.release(id);
        }
        Ok(fill)
    }

    /// Reconcile a quote against a status report
    pub fn on_order_status(
        &mut self,
        id: OrderId,
        fill_volume: Lots,
        remaining: Lots,
        fees: i64,
    ) -> Result<StatusOutcome, LedgerError> {
        let order = self.quote_mut(id)?;
        let update = order.apply_status(fill_volume, remaining, fees);
        let data = *order.data();

        self.position.add_fees(update.fee_delta);
        let fill = self.credit(&data, data.price, update.newly_filled);
        if update.status.is_terminal() {
            debug!(%id, status = %update.status, "order closed");
            self.release(id);
        }

        Ok(StatusOutcome {
            status: update.status,
            fill,
        })
    }

    /// Gateway error tied to an order: the order is dead, its slot is free
    pub fn on_error(&mut self, id: OrderId) -> Result<OrderData, LedgerError> {
        let order = self
            .orders
            .get_mut(&id)
            .ok_or(LedgerError::UnknownOrder(id))?;
        order.reject();
        let data = *order.data();
        self.release(id);
        Ok(data)
    }

    // ========================================================================
    // Hedge orders
    // ========================================================================

    /// Record and send a marketable hedge order
    pub fn insert_hedge<G: Gateway>(
        &mut self,
        side: Side,
        price: Cents,
        volume: Lots,
        gateway: &mut G,
    ) -> OrderId {
        let id = self.ids.next_id();
        let data = OrderData {
            id,
            side,
            kind: OrderKind::Hedge,
            price,
        };
        self.orders.insert(id, TrackedOrder::pending(data, volume));

        info!(%id, %side, price, volume, "hedge");
        gateway.hedge_order(id, side, price, volume);
        id
    }

    /// Close a hedge order with its execution report
    pub fn on_hedge_filled(
        &mut self,
        id: OrderId,
        average_price: Cents,
        volume: Lots,
    ) -> Result<HedgeFill, LedgerError> {
        let order = self
            .orders
            .get_mut(&id)
            .ok_or(LedgerError::UnknownOrder(id))?;
        if order.data().kind != OrderKind::Hedge {
            return Err(LedgerError::NotAHedge(id));
        }

        let credited = order.settle(volume);
        let side = order.data().side;
        self.release(id);

        if credited > 0 {
            self.position.apply_hedge_fill(side, average_price, credited);
        }

        Ok(HedgeFill {
            id,
            side,
            price: average_price,
            volume: credited,
            hedge_position: self.position.hedge,
        })
    }

    /// Signed hedge volume sent but not yet reported
    pub fn hedge_in_flight(&self) -> i64 {
        self.orders
            .values()
            .filter(|order| order.data().kind == OrderKind::Hedge && !order.is_terminal())
            .map(|order| order.data().side.sign() * order.remaining() as i64)
            .sum()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn position_limit(&self) -> i64 {
        self.position_limit
    }

    pub fn order(&self, id: OrderId) -> Option<&TrackedOrder> {
        self.orders.get(&id)
    }

    /// The order occupying a slot
    pub fn slot_order(&self, slot: Slot) -> Option<&TrackedOrder> {
        self.slots[slot.index()].and_then(|id| self.orders.get(&id))
    }

    /// Resting quotes by slot index, for strategies
    pub fn live_quotes(&self) -> [Option<LiveQuote>; Slot::COUNT] {
        let mut live = [None; Slot::COUNT];
        for slot in Slot::ALL {
            live[slot.index()] = self.slot_order(slot).map(|order| LiveQuote {
                id: order.id(),
                price: order.data().price,
                remaining: order.remaining(),
            });
        }
        live
    }

    /// Remaining volume of every resting quote on a side
    pub fn resting(&self, side: Side) -> Lots {
        Slot::ALL
            .iter()
            .filter(|slot| slot.side == side)
            .filter_map(|slot| self.slot_order(*slot))
            .map(TrackedOrder::remaining)
            .sum()
    }

    /// Orders of either kind not yet terminal
    pub fn open_orders(&self) -> usize {
        self.orders.len()
    }

    /// Every open order, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &TrackedOrder> + '_ {
        self.orders.values()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn quote_mut(&mut self, id: OrderId) -> Result<&mut TrackedOrder, LedgerError> {
        let order = self
            .orders
            .get_mut(&id)
            .ok_or(LedgerError::UnknownOrder(id))?;
        match order.data().kind {
            OrderKind::Quote(_) => Ok(order),
            OrderKind::Hedge => Err(LedgerError::NotAQuote(id)),
        }
    }

    fn credit(&mut self, data: &OrderData, price: Cents, volume: Lots) -> Option<FillEvent> {
        if volume == 0 {
            return None;
        }
        let OrderKind::Quote(tier) = data.kind else {
            return None;
        };

        let position = self.position.apply_primary_fill(data.side, price, volume);
        info!(id = %data.id, side = %data.side, price, volume, position, "fill");

        Some(FillEvent {
            id: data.id,
            side: data.side,
            tier,
            price,
            volume,
            position,
        })
    }

    /// Drop a terminal order from the map and free its slot
    fn release(&mut self, id: OrderId) {
        if let Some(order) = self.orders.remove(&id) {
            if let Some(slot) = order.data().slot() {
                if self.slots[slot.index()] == Some(id) {
                    self.slots[slot.index()] = None;
                }
            }
        }
    }
}
