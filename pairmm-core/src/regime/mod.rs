//! Normal / Trending regime classification
//!
//! ```text
//!            stable ordering && calm inventory
//!   Normal ──────────────────────────────────────▶ Trending { since }
//!     ▲                                                  │
//!     └──────────── instability, churn, or expiry ───────┘
//! ```
//!
//! Each accepted mid updates an "ordering" flag: is the primary's trailing
//! average below the hedge's? A trend is declared when that flag has
//! held steady over a trailing span while the primary position has been
//! quiet. The declaration lasts `trend_duration` primary ticks from the
//! tick it fired, then lapses; it is dropped at once, timer cleared, if
//! either condition fails first.

use crate::config::RegimeConfig;
use crate::core::fixed_point::MILLI;
use crate::core::{Cents, Instrument};
use crate::stats::{math, RollingWindow};
use tracing::info;

/// Market classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Regime {
    /// Mean-reverting: quote both sides, hedge fills as they come
    #[default]
    Normal,
    /// Directional: hedge in tranches along the trend
    Trending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    Trending { since: u64 },
}

/// Regime state machine fed by every accepted mid
#[derive(Debug, Clone)]
pub struct RegimeDetector {
    config: RegimeConfig,
    primary_mids: RollingWindow<Cents>,
    hedge_mids: RollingWindow<Cents>,
    orderings: RollingWindow<bool>,
    ordering_count: u64,
    positions: RollingWindow<i64>,
    primary_ticks: u64,
    state: State,
}

impl RegimeDetector {
    pub fn new(config: &RegimeConfig) -> Self {
        Self {
            primary_mids: RollingWindow::new(config.ordering_window),
            hedge_mids: RollingWindow::new(config.ordering_window),
            orderings: RollingWindow::new(config.stability_span + config.stability_lag),
            ordering_count: 0,
            positions: RollingWindow::new(config.position_window),
            primary_ticks: 0,
            state: State::Normal,
            config: config.clone(),
        }
    }

    /// Feed one accepted mid and re-evaluate
    ///
    /// `position` is the current primary position; it is sampled on
    /// primary updates only.
    pub fn update(&mut self, instrument: Instrument, mid: Cents, position: i64) -> Regime {
        match instrument {
            Instrument::Primary => {
                self.primary_mids.push(mid);
                self.positions.push(position);
                self.primary_ticks += 1;
            }
            Instrument::Hedge => self.hedge_mids.push(mid),
        }

        let ordering = self.ordering();
        self.orderings.push(ordering);
        self.ordering_count += 1;

        if !self.config.enabled {
            return Regime::Normal;
        }

        let previous = self.regime();
        let now = self.primary_ticks;
        self.state = match (self.state, self.is_stable() && self.is_calm()) {
            (_, false) => State::Normal,
            (State::Normal, true) => State::Trending { since: now },
            (State::Trending { since }, true) => {
                if now >= since + self.config.trend_duration {
                    State::Normal
                } else {
                    State::Trending { since }
                }
            }
        };

        let current = self.regime();
        if current != previous {
            info!(from = ?previous, to = ?current, tick = now, "regime changed");
        }
        current
    }

    pub fn regime(&self) -> Regime {
        match self.state {
            State::Normal => Regime::Normal,
            State::Trending { .. } => Regime::Trending,
        }
    }

    /// Primary tick at which the current trend was declared
    pub fn trend_since(&self) -> Option<u64> {
        match self.state {
            State::Trending { since } => Some(since),
            State::Normal => None,
        }
    }

    /// Primary trailing average below the hedge's. False until both have data.
    fn ordering(&self) -> bool {
        let (np, nh) = (self.primary_mids.len() as i128, self.hedge_mids.len() as i128);
        if np == 0 || nh == 0 {
            return false;
        }
        let sp: i128 = self.primary_mids.iter().map(|v| v as i128).sum();
        let sh: i128 = self.hedge_mids.iter().map(|v| v as i128).sum();
        // sp/np < sh/nh without division
        sp * nh < sh * np
    }

    /// The span ending `stability_lag` flags ago all agree with the latest flag
    fn is_stable(&self) -> bool {
        let span = self.config.stability_span;
        let lag = self.config.stability_lag;
        if self.ordering_count <= self.config.min_history || self.orderings.len() < span + lag {
            return false;
        }
        let Some(latest) = self.orderings.last() else {
            return false;
        };
        (lag..lag + span).all(|back| self.orderings.from_end(back) == Some(latest))
    }

    /// Position deviation strictly below the configured limit
    fn is_calm(&self) -> bool {
        math::stddev_milli(self.positions.iter()) < self.config.position_std_limit * MILLI
    }

    pub fn reset(&mut self) {
        *self = Self::new(&self.config);
    }
}
