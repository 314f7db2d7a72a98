//! Domain error types
//!
//! None of these are fatal. The engine logs them and carries on with the
//! next event; they exist so callers can tell exactly why something was
//! skipped.

use super::types::{Instrument, Lots, OrderId, OrderStatus, Slot};
use thiserror::Error;

/// Errors that can occur when applying a fill to an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FillError {
    #[error("fill quantity cannot be zero")]
    ZeroQuantity,

    #[error("fill price must be positive")]
    ZeroPrice,

    #[error("fill quantity {fill_qty} exceeds remaining {remaining_qty} (total order: {total_qty})")]
    ExceedsRemaining {
        fill_qty: Lots,
        remaining_qty: Lots,
        total_qty: Lots,
    },

    #[error("order is {status}, fills are no longer accepted")]
    NotResting { status: OrderStatus },
}

/// Errors raised by ledger lookups and transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("unknown order {0}")]
    UnknownOrder(OrderId),

    #[error("order {0} is a hedge order, not a quote")]
    NotAQuote(OrderId),

    #[error("order {0} is a quote, not a hedge order")]
    NotAHedge(OrderId),

    #[error("invalid fill for order {id}: {source}")]
    InvalidFill {
        id: OrderId,
        #[source]
        source: FillError,
    },
}

/// Why an inbound event or a candidate order was skipped
///
/// Every variant is recovered within the same event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventAnomaly {
    #[error("stale {instrument} sequence {sequence} (last accepted {last})")]
    StaleSequence {
        instrument: Instrument,
        sequence: u64,
        last: u64,
    },

    #[error("degenerate {instrument} book: empty side or zero top-of-book volume")]
    DegenerateMarket { instrument: Instrument },

    #[error("numeric input unavailable: {0}")]
    NumericDegenerate(&'static str),

    #[error("{slot} order of {size} lots would breach position limit {limit} (position {position})")]
    PositionLimitBreach {
        slot: Slot,
        size: Lots,
        position: i64,
        limit: i64,
    },

    #[error("gateway rejected order {0}")]
    OrderRejected(OrderId),
}
