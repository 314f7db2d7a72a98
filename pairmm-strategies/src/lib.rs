//! PairMM Strategies - quoting variants for the pair market maker
//!
//! Both strategies implement [`pairmm_core::engine::Strategy`] and are
//! plugged into `Engine<S, G>` as a type parameter.
//!
//! ## Available Strategies
//!
//! ### [`SingleRail`]
//!
//! One bid and one ask around the primary's VWAP or imbalance mid:
//! - Inventory skew against the current position
//! - Hedge momentum in basis points, decayed per hedge update
//! - Whole-tick shift along the VWAP trend slope
//! - Optional reversal gate on new orders
//!
//! ### [`MultiRail`]
//!
//! Inner and outer rails per side around the hedge mid, spaced by the
//! deviation of the primary/hedge spread:
//! - Rails never collapse onto one price
//! - Outer rails withdrawn when the opposite best crosses the inner rail
//! - Full-lot or shrinking sizes under the position limit
//!
//! ## Choosing at load time
//!
//! [`AnyStrategy`] picks the variant named in `quoting.variant`:
//!
//! ```rust,ignore
//! let config = EngineConfig::load("pairmm.toml")?;
//! let strategy = AnyStrategy::from_config(&config)?;
//! let engine = Engine::new(config, strategy, gateway)?;
//! ```

pub mod multi_rail;
pub mod single_rail;

pub use multi_rail::{MultiRail, Rails};
pub use single_rail::SingleRail;

use pairmm_core::config::{ConfigError, EngineConfig, StrategyVariant};
use pairmm_core::engine::Strategy;
use pairmm_core::quoting::{QuoteContext, QuoteSet};
use thiserror::Error;

/// A strategy could not be built from the configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("configuration is for {found:?}, not {expected:?}")]
    VariantMismatch {
        expected: StrategyVariant,
        found: StrategyVariant,
    },
}

/// Either variant, chosen from configuration
#[derive(Debug, Clone)]
pub enum AnyStrategy {
    SingleRail(SingleRail),
    MultiRail(MultiRail),
}

impl AnyStrategy {
    pub fn from_config(config: &EngineConfig) -> Result<Self, StrategyError> {
        Ok(match config.quoting.variant {
            StrategyVariant::SingleRail => AnyStrategy::SingleRail(SingleRail::from_config(config)?),
            StrategyVariant::MultiRail => AnyStrategy::MultiRail(MultiRail::from_config(config)?),
        })
    }
}

impl Strategy for AnyStrategy {
    #[inline]
    fn quote(&mut self, ctx: &QuoteContext<'_>) -> Option<QuoteSet> {
        match self {
            AnyStrategy::SingleRail(s) => s.quote(ctx),
            AnyStrategy::MultiRail(s) => s.quote(ctx),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AnyStrategy::SingleRail(s) => s.name(),
            AnyStrategy::MultiRail(s) => s.name(),
        }
    }

    fn reset(&mut self) {
        match self {
            AnyStrategy::SingleRail(s) => s.reset(),
            AnyStrategy::MultiRail(s) => s.reset(),
        }
    }
}
