//! Core value types and the order lifecycle
//!
//! - `OrderId`, `Side`, `Tier`, `Slot`, `Instrument`: identifiers, all `Copy`
//! - `Position`: holdings in both instruments, mutated only by fills
//! - `TrackedOrder`: one order record with its lifecycle state
//! - `fixed_point`: integer cents, ticks, and milli-scaled ratios

pub mod errors;
pub mod order_fsm;
pub mod types;

mod fixed_point_proptest;

// Re-export commonly used types
pub use errors::{EventAnomaly, FillError, LedgerError};
pub use order_fsm::{OrderData, OrderKind, StatusUpdate, TrackedOrder};
pub use types::{
    fixed_point, Cents, Instrument, Lifespan, Lots, OrderId, OrderIdSequence, OrderStatus,
    Position, Side, Slot, Tier,
};
