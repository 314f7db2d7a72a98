//! PairMM Core - Market-Making Decision Engine for an ETF and its Hedge
//!
//! The engine reacts to order book snapshots and execution reports for two
//! correlated instruments (the quoted primary and a hedge) and decides
//! which resting quotes to hold and when to offset inventory.
//!
//! ## Architecture
//! - **Single owner**: one [`Engine`] holds every window, map and counter
//! - **Integer cents** for every price, floor rounding throughout
//! - **Generic dispatch**: strategy and gateway are type parameters
//! - **No fatal paths**: each event returns an [`EventOutcome`]
//!
//! ## Core Modules
//! - `core`: value types, order lifecycle, error taxonomy
//! - `config`: serde configuration, validation, named profiles
//! - `stats`: rolling VWAP, bands, slopes and pair spread
//! - `regime`: Normal / Trending state machine
//! - `quoting`: quote intents and sizing primitives shared by strategies
//! - `ledger`: live orders, slots and position
//! - `hedge`: offsetting orders on the hedge instrument
//! - `engine`: the event pipeline and the gateway seam
//!
//! Concrete strategies live in `pairmm-strategies`.

pub mod config;
pub mod core;
pub mod engine;
pub mod hedge;
pub mod ledger;
pub mod quoting;
pub mod regime;
pub mod stats;
pub mod testing;
pub mod utils;

// Re-export core types
pub use core::{
    fixed_point, Cents, EventAnomaly, Instrument, LedgerError, Lots, OrderId, OrderStatus,
    Position, Side, Slot, Tier,
};

pub use config::{ConfigProfile, EngineConfig};
pub use engine::{BookUpdate, Engine, EngineStats, EventOutcome, Gateway, RecordingGateway, Strategy};

// Re-export error types
pub use anyhow::{Error, Result};

/// Prelude for convenient imports
pub mod prelude {
    // Core types
    pub use crate::core::{
        fixed_point, Cents, Instrument, Lots, OrderId, Position, Side, Slot, Tier,
    };

    // Configuration
    pub use crate::config::{ConfigProfile, EngineConfig, SizePolicy, StrategyVariant};

    // Engine
    pub use crate::engine::{
        BookUpdate, Engine, EngineStats, EventOutcome, Gateway, RecordingGateway, Strategy,
    };

    // Quoting
    pub use crate::quoting::{QuoteContext, QuoteSet, SlotIntent};
    pub use crate::regime::Regime;

    // Error types
    pub use crate::{Error, Result};
}
