//! Order lifecycle state machine
//!
//! Every order the engine sends, quote or hedge, is tracked as one
//! [`TrackedOrder`] record keyed by its id. The record owns its state and
//! only moves along the edges below.
//!
//! # State Diagram
//!
//! ```text
//!                    ┌─────────────┐
//!                    │   Pending   │──────────────┐
//!                    └──────┬──────┘              │
//!                           │ status, remaining>0 │ error
//!                           ▼                     ▼
//!                    ┌─────────────┐        ┌──────────┐
//!                    │    Live     │───────▶│ Rejected │
//!                    └──────┬──────┘        └──────────┘
//!                           │ fill             (terminal)
//!                           ▼
//!                 ┌──────────────────┐
//!                 │ PartiallyFilled  │
//!                 └────────┬─────────┘
//!            remaining=0   │   remaining=0
//!          via fills ┌─────┴─────┐ via cancel
//!                    ▼           ▼
//!              ┌────────┐  ┌───────────┐
//!              │ Filled │  │ Cancelled │
//!              └────────┘  └───────────┘
//!              (terminal)    (terminal)
//! ```
//!
//! Any non-terminal state may go straight to Filled, Cancelled or Rejected.
//!
//! # Fill attribution
//!
//! The gateway reports executions twice: once per fill (`order_filled`)
//! and again as a cumulative total inside `order_status`. Either can
//! arrive first. The record keeps both running totals and credits the
//! position with the larger one, so a fill is never counted twice and
//! never lost.

use super::errors::FillError;
use super::types::{Cents, Lots, OrderId, OrderStatus, Side, Slot, Tier};

// ============================================================================
// Order identity
// ============================================================================

/// What an order is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKind {
    /// Resting quote on the primary instrument
    Quote(Tier),
    /// Marketable offsetting order on the hedge instrument
    Hedge,
}

/// Immutable facts about an order, fixed at insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderData {
    pub id: OrderId,
    pub side: Side,
    pub kind: OrderKind,
    /// Limit price in cents
    pub price: Cents,
}

impl OrderData {
    /// The slot this order occupies, if it is a quote
    pub fn slot(&self) -> Option<Slot> {
        match self.kind {
            OrderKind::Quote(tier) => Some(Slot::new(self.side, tier)),
            OrderKind::Hedge => None,
        }
    }
}

/// Effect of a status report on an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Fill volume credited by this report that no earlier event had covered
    pub newly_filled: Lots,
    /// Change in the order's cumulative fees
    pub fee_delta: i64,
    /// State after the report
    pub status: OrderStatus,
}

// ============================================================================
// Tracked order record
// ============================================================================

/// One order and its lifecycle state
#[derive(Debug, Clone)]
pub struct TrackedOrder {
    data: OrderData,
    status: OrderStatus,
    /// Current total size; shrinks when an amend is acknowledged
    quantity: Lots,
    filled_by_fills: Lots,
    filled_by_status: Lots,
    /// Last cumulative fee figure reported by the gateway
    fees: i64,
    cancel_requested: bool,
    /// Total size requested by an outstanding amend
    amend_requested: Option<Lots>,
}

impl TrackedOrder {
    /// A freshly inserted order, awaiting acknowledgment
    pub fn pending(data: OrderData, quantity: Lots) -> Self {
        Self {
            data,
            status: OrderStatus::Pending,
            quantity,
            filled_by_fills: 0,
            filled_by_status: 0,
            fees: 0,
            cancel_requested: false,
            amend_requested: None,
        }
    }

    #[inline]
    pub fn data(&self) -> &OrderData {
        &self.data
    }

    #[inline]
    pub fn id(&self) -> OrderId {
        self.data.id
    }

    #[inline]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    #[inline]
    pub fn quantity(&self) -> Lots {
        self.quantity
    }

    /// Volume credited to the position so far
    #[inline]
    pub fn filled(&self) -> Lots {
        self.filled_by_fills.max(self.filled_by_status)
    }

    #[inline]
    pub fn remaining(&self) -> Lots {
        self.quantity.saturating_sub(self.filled())
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    #[inline]
    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    #[inline]
    pub fn amend_requested(&self) -> Option<Lots> {
        self.amend_requested
    }

    /// Pending -> Live. No effect in any other state.
    pub fn acknowledge(&mut self) {
        if self.status == OrderStatus::Pending {
            self.status = OrderStatus::Live;
        }
    }

    /// Mark a cancel as sent. Returns false if one was already outstanding.
    pub fn request_cancel(&mut self) -> bool {
        if self.cancel_requested || self.is_terminal() {
            return false;
        }
        self.cancel_requested = true;
        true
    }

    /// Mark an amend down to `total` lots as sent
    ///
    /// Returns false when the amend would not shrink the order, when an
    /// amend to the same size is already outstanding, or when a cancel is
    /// already in flight.
    pub fn request_amend(&mut self, total: Lots) -> bool {
        if self.cancel_requested || self.is_terminal() {
            return false;
        }
        if total >= self.quantity || total <= self.filled() {
            return false;
        }
        if self.amend_requested == Some(total) {
            return false;
        }
        self.amend_requested = Some(total);
        true
    }

    /// Apply one execution report
    ///
    /// Returns the volume newly credited to the position, which is zero
    /// when a status report already covered this fill.
    pub fn apply_fill(&mut self, volume: Lots, price: Cents) -> Result<Lots, FillError> {
        if self.is_terminal() {
            return Err(FillError::NotResting {
                status: self.status,
            });
        }
        if volume == 0 {
            return Err(FillError::ZeroQuantity);
        }
        if price <= 0 {
            return Err(FillError::ZeroPrice);
        }

        let remaining_by_fills = self.quantity.saturating_sub(self.filled_by_fills);
        if volume > remaining_by_fills {
            return Err(FillError::ExceedsRemaining {
                fill_qty: volume,
                remaining_qty: remaining_by_fills,
                total_qty: self.quantity,
            });
        }

        let before = self.filled();
        self.filled_by_fills += volume;
        let credited = self.filled() - before;

        self.status = if self.remaining() == 0 {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };

        Ok(credited)
    }

    /// Reconcile against a status report
    ///
    /// `fill_volume` and `fees` are cumulative for the order. A report with
    /// zero remaining volume is terminal: Filled when everything was
    /// executed, Cancelled otherwise.
    pub fn apply_status(&mut self, fill_volume: Lots, remaining: Lots, fees: i64) -> StatusUpdate {
        let before = self.filled();
        self.filled_by_status = self.filled_by_status.max(fill_volume);
        let newly_filled = self.filled() - before;

        let fee_delta = fees - self.fees;
        self.fees = fees;

        if remaining == 0 {
            // An outstanding amend may have shrunk the order to exactly what traded
            let target = self
                .amend_requested
                .map_or(self.quantity, |total| total.min(self.quantity));
            self.status = if self.filled() > 0 && self.filled() >= target {
                OrderStatus::Filled
            } else {
                OrderStatus::Cancelled
            };
        } else {
            self.quantity = (fill_volume + remaining).max(self.filled());
            if self
                .amend_requested
                .is_some_and(|total| self.quantity <= total)
            {
                self.amend_requested = None;
            }
            self.status = if self.filled() > 0 {
                OrderStatus::PartiallyFilled
            } else {
                OrderStatus::Live
            };
        }

        StatusUpdate {
            newly_filled,
            fee_delta,
            status: self.status,
        }
    }

    /// Gateway error for this order
    pub fn reject(&mut self) {
        if !self.is_terminal() {
            self.status = OrderStatus::Rejected;
        }
    }

    /// Close a fill-and-kill hedge order with its single execution report
    ///
    /// Whatever did not trade is gone. Returns the volume credited.
    pub fn settle(&mut self, volume: Lots) -> Lots {
        if self.is_terminal() {
            return 0;
        }
        let credited = volume.min(self.quantity);
        self.filled_by_fills = credited;
        self.status = if credited > 0 && credited == self.quantity {
            OrderStatus::Filled
        } else {
            OrderStatus::Cancelled
        };
        credited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(id: u64, quantity: Lots) -> TrackedOrder {
        TrackedOrder::pending(
            OrderData {
                id: OrderId(id),
                side: Side::Buy,
                kind: OrderKind::Quote(Tier::Inner),
                price: 500,
            },
            quantity,
        )
    }

    #[test]
    fn test_pending_acknowledged_by_status() {
        let mut order = quote(1, 10);
        let update = order.apply_status(0, 10, 0);

        assert_eq!(update.status, OrderStatus::Live);
        assert_eq!(update.newly_filled, 0);
        assert_eq!(order.remaining(), 10);
    }

    #[test]
    fn test_partial_then_full_fill() {
        let mut order = quote(1, 10);
        order.acknowledge();

        assert_eq!(order.apply_fill(4, 500), Ok(4));
        assert_eq!(order.status(), OrderStatus::PartiallyFilled);
        assert_eq!(order.remaining(), 6);

        assert_eq!(order.apply_fill(6, 500), Ok(6));
        assert_eq!(order.status(), OrderStatus::Filled);
        assert!(order.is_terminal());
    }

    #[test]
    fn test_fill_validation() {
        let mut order = quote(1, 10);

        assert_eq!(order.apply_fill(0, 500), Err(FillError::ZeroQuantity));
        assert_eq!(order.apply_fill(1, 0), Err(FillError::ZeroPrice));
        assert_eq!(
            order.apply_fill(11, 500),
            Err(FillError::ExceedsRemaining {
                fill_qty: 11,
                remaining_qty: 10,
                total_qty: 10
            })
        );
        // Rejected fills leave the order untouched
        assert_eq!(order.filled(), 0);
        assert_eq!(order.status(), OrderStatus::Pending);
    }

    #[test]
    fn test_status_fill_is_credited_once() {
        let mut order = quote(1, 10);
        order.acknowledge();

        // Fill report first, then the status repeating it
        assert_eq!(order.apply_fill(4, 500), Ok(4));
        let update = order.apply_status(4, 6, -1);
        assert_eq!(update.newly_filled, 0);
        assert_eq!(update.fee_delta, -1);

        // Status first, then the fill report repeating it
        let update = order.apply_status(7, 3, -2);
        assert_eq!(update.newly_filled, 3);
        assert_eq!(update.fee_delta, -1);
        assert_eq!(order.apply_fill(3, 500), Ok(0));
        assert_eq!(order.filled(), 7);
    }

    #[test]
    fn test_zero_remaining_status_cancels_unfilled_order() {
        let mut order = quote(1, 10);
        order.acknowledge();
        order.apply_fill(3, 500).unwrap();

        let update = order.apply_status(3, 0, 0);
        assert_eq!(update.status, OrderStatus::Cancelled);
        assert_eq!(update.newly_filled, 0);
    }

    #[test]
    fn test_zero_remaining_status_with_full_fill_is_filled() {
        let mut order = quote(1, 10);
        order.acknowledge();

        let update = order.apply_status(10, 0, -2);
        assert_eq!(update.status, OrderStatus::Filled);
        assert_eq!(update.newly_filled, 10);
        assert_eq!(update.fee_delta, -2);
    }

    #[test]
    fn test_fills_rejected_after_terminal() {
        let mut order = quote(1, 10);
        order.reject();

        assert_eq!(order.status(), OrderStatus::Rejected);
        assert!(matches!(
            order.apply_fill(1, 500),
            Err(FillError::NotResting { .. })
        ));
    }

    #[test]
    fn test_cancel_requested_once() {
        let mut order = quote(1, 10);
        assert!(order.request_cancel());
        assert!(!order.request_cancel());
        // No amend while a cancel is in flight
        assert!(!order.request_amend(5));
    }

    #[test]
    fn test_amend_shrinks_after_ack() {
        let mut order = quote(1, 20);
        order.acknowledge();

        assert!(order.request_amend(15));
        assert!(!order.request_amend(15));
        assert!(!order.request_amend(25));

        order.apply_status(0, 15, 0);
        assert_eq!(order.quantity(), 15);
        assert_eq!(order.amend_requested(), None);
    }

    #[test]
    fn test_hedge_settlement() {
        let mut full = TrackedOrder::pending(
            OrderData {
                id: OrderId(2),
                side: Side::Sell,
                kind: OrderKind::Hedge,
                price: 100,
            },
            10,
        );
        assert_eq!(full.settle(10), 10);
        assert_eq!(full.status(), OrderStatus::Filled);

        let mut unsuccessful = TrackedOrder::pending(*full.data(), 10);
        assert_eq!(unsuccessful.settle(0), 0);
        assert_eq!(unsuccessful.status(), OrderStatus::Cancelled);
        assert_eq!(unsuccessful.settle(10), 0);
    }
}
