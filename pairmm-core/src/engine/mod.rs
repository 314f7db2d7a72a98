//! Decision engine
//!
//! - `generic`: the engine, generic over strategy and gateway
//! - `gateway`: outbound command seam and a recording implementation
//! - `events`: inbound payloads and per-event outcomes

pub mod events;
pub mod gateway;
pub mod generic;

pub use events::{BookUpdate, EventOutcome, BOOK_DEPTH};
pub use gateway::{Command, Gateway, RecordingGateway};
pub use generic::{Engine, EngineStats, Strategy};
