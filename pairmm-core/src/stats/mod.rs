//! Rolling price statistics per instrument
//!
//! [`StatisticsEngine::observe`] turns a top-of-book snapshot into a
//! [`PriceSample`], appends it to that instrument's window and recomputes
//! the [`Signals`]:
//!
//! - VWAP over the trailing `vwap_window` samples (current one included)
//! - Dispersion bands: VWAP ± population deviation of the trailing
//!   `band_window` VWAP values times the band offset
//! - `trend_slope`: least squares of VWAP against tick over `trend_window`
//! - `price_slope`: least squares of mid against tick over `price_slope_window`
//! - `price_average`: mean mid over `average_window`
//! - Band-slope reversal latches
//!
//! Everything except the reversal latches is a pure function of the window
//! contents. Replaying the same snapshots into a fresh engine reproduces
//! the same signals at every step.
//!
//! Slopes are in thousandths of a cent per tick. Any statistic without
//! enough history reads as neutral (0, or `None` for the average).

pub mod math;
pub mod window;

pub use window::RollingWindow;

use crate::config::StatisticsConfig;
use crate::core::fixed_point::{floor_div, floor_div_wide, MILLI};
use crate::core::{Cents, Instrument, Lots};
use tracing::trace;

/// One accepted top-of-book observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSample {
    /// Monotonic tick counter
    pub timestamp: u64,
    /// `floor((bid + ask) / 2)`
    pub mid: Cents,
    /// `(bid * ask_vol + ask * bid_vol) / (bid_vol + ask_vol)`, floored
    pub imbalance_mid: Cents,
    /// Combined best bid and best ask volume
    pub volume: Lots,
}

/// Direction suggested by the band-slope reversal latches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reversal {
    #[default]
    None,
    /// Both bands turned up
    Bid,
    /// Both bands turned down
    Ask,
}

/// Everything derived from one instrument's window after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub timestamp: u64,
    pub mid: Cents,
    pub imbalance_mid: Cents,
    /// Imbalance mid of the previous accepted sample
    pub prev_imbalance_mid: Option<Cents>,
    pub vwap: Cents,
    pub upper_band: Cents,
    pub lower_band: Cents,
    pub trend_slope: i64,
    pub price_slope: i64,
    pub price_average: Option<Cents>,
    pub reversal: Reversal,
    /// Samples accepted so far
    pub samples: u64,
}

/// Latest primary-minus-hedge mid spread and its dispersion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairSpread {
    pub spread: Cents,
    /// Population deviation of the spread window, floored to cents
    pub stddev: Cents,
    pub observations: usize,
}

/// Sign-change latches on the upper and lower band slopes
#[derive(Debug, Clone, Copy, Default)]
struct ReversalLatch {
    upper: i8,
    lower: i8,
    upper_slopes: [i64; 2],
    lower_slopes: [i64; 2],
}

impl ReversalLatch {
    fn push(&mut self, upper_slope: i64, lower_slope: i64) {
        self.upper_slopes = [self.upper_slopes[1], upper_slope];
        self.lower_slopes = [self.lower_slopes[1], lower_slope];

        // Latches hold once they agree on a direction, until cleared
        if self.upper != self.lower || self.upper == 0 || self.lower == 0 {
            self.upper = Self::turn(self.upper, self.upper_slopes);
            self.lower = Self::turn(self.lower, self.lower_slopes);
        }
    }

    fn turn(latch: i8, [prev, cur]: [i64; 2]) -> i8 {
        if prev < 0 && cur >= 0 {
            1
        } else if prev > 0 && cur <= 0 {
            -1
        } else {
            latch
        }
    }

    fn reversal(&self) -> Reversal {
        match (self.upper, self.lower) {
            (1, 1) => Reversal::Bid,
            (-1, -1) => Reversal::Ask,
            _ => Reversal::None,
        }
    }

    fn clear(&mut self) {
        self.upper = 0;
        self.lower = 0;
    }
}

/// Windows and cached signals for one instrument
#[derive(Debug, Clone)]
struct InstrumentSeries {
    samples: RollingWindow<PriceSample>,
    /// (timestamp, vwap)
    vwaps: RollingWindow<(u64, Cents)>,
    upper_bands: RollingWindow<Cents>,
    lower_bands: RollingWindow<Cents>,
    latch: ReversalLatch,
    accepted: u64,
    signals: Option<Signals>,
}

impl InstrumentSeries {
    fn new(config: &StatisticsConfig) -> Self {
        let sample_capacity = config
            .vwap_window
            .max(config.price_slope_window)
            .max(config.average_window)
            .max(2);
        Self {
            samples: RollingWindow::new(sample_capacity),
            vwaps: RollingWindow::new(config.band_window.max(config.trend_window)),
            upper_bands: RollingWindow::new(config.band_slope_lag),
            lower_bands: RollingWindow::new(config.band_slope_lag),
            latch: ReversalLatch::default(),
            accepted: 0,
            signals: None,
        }
    }
}

/// Rolling statistics for both instruments
#[derive(Debug, Clone)]
pub struct StatisticsEngine {
    config: StatisticsConfig,
    band_offset_milli: i64,
    series: [InstrumentSeries; 2],
    spread: RollingWindow<Cents>,
}

impl StatisticsEngine {
    pub fn new(config: &StatisticsConfig) -> Self {
        Self {
            band_offset_milli: config.band_offset_milli(),
            series: [InstrumentSeries::new(config), InstrumentSeries::new(config)],
            spread: RollingWindow::new(config.spread_window),
            config: config.clone(),
        }
    }

    /// Record a top-of-book snapshot and recompute that instrument's signals
    ///
    /// Returns `None` without touching any window when the book is
    /// degenerate (an empty side, or zero combined volume) or when
    /// `timestamp` is older than the last accepted sample.
    pub fn observe(
        &mut self,
        instrument: Instrument,
        timestamp: u64,
        best_bid: Cents,
        best_bid_volume: Lots,
        best_ask: Cents,
        best_ask_volume: Lots,
    ) -> Option<Signals> {
        let Some(volume) = best_bid_volume.checked_add(best_ask_volume) else {
            trace!(%instrument, "book volume overflows, sample discarded");
            return None;
        };
        if volume == 0 || best_bid <= 0 || best_ask <= 0 {
            trace!(%instrument, "degenerate book, sample discarded");
            return None;
        }

        let series = &mut self.series[instrument.index()];
        if series.samples.last().is_some_and(|last| timestamp < last.timestamp) {
            trace!(%instrument, timestamp, "out-of-order sample discarded");
            return None;
        }

        let prev_imbalance_mid = series.samples.last().map(|s| s.imbalance_mid);
        let sample = PriceSample {
            timestamp,
            mid: floor_div(best_bid + best_ask, 2),
            imbalance_mid: floor_div_wide(
                best_bid as i128 * best_ask_volume as i128
                    + best_ask as i128 * best_bid_volume as i128,
                volume as i128,
            ),
            volume,
        };
        series.samples.push(sample);
        series.accepted += 1;

        let config = &self.config;

        let vwap = math::vwap(
            series
                .samples
                .tail(config.vwap_window)
                .map(|s| (s.mid, s.volume)),
        );
        series.vwaps.push((timestamp, vwap));

        let deviation_milli =
            math::stddev_milli(series.vwaps.tail(config.band_window).map(|(_, v)| v));
        let half_width = floor_div_wide(
            deviation_milli as i128 * self.band_offset_milli as i128,
            (MILLI * MILLI) as i128,
        );
        let upper_band = vwap + half_width;
        let lower_band = vwap - half_width;
        series.upper_bands.push(upper_band);
        series.lower_bands.push(lower_band);

        // Band slopes only once the deviation window is full
        if series.accepted > config.band_window as u64 {
            if let (Some(upper_slope), Some(lower_slope)) = (
                band_slope_milli(&series.upper_bands, config.band_slope_lag),
                band_slope_milli(&series.lower_bands, config.band_slope_lag),
            ) {
                series.latch.push(upper_slope, lower_slope);
            }
        }

        let trend_slope = if series.vwaps.len() >= config.trend_window {
            math::ols_slope_milli(
                series
                    .vwaps
                    .tail(config.trend_window)
                    .map(|(t, v)| (t as i64, v)),
            )
        } else {
            0
        };

        let price_slope = if series.samples.len() >= config.price_slope_window {
            math::ols_slope_milli(
                series
                    .samples
                    .tail(config.price_slope_window)
                    .map(|s| (s.timestamp as i64, s.mid)),
            )
        } else {
            0
        };

        let price_average = if series.samples.len() >= config.average_window {
            math::mean(series.samples.tail(config.average_window).map(|s| s.mid))
        } else {
            None
        };

        let signals = Signals {
            timestamp,
            mid: sample.mid,
            imbalance_mid: sample.imbalance_mid,
            prev_imbalance_mid,
            vwap,
            upper_band,
            lower_band,
            trend_slope,
            price_slope,
            price_average,
            reversal: series.latch.reversal(),
            samples: series.accepted,
        };
        series.signals = Some(signals);

        self.record_spread();

        trace!(
            %instrument,
            timestamp,
            mid = signals.mid,
            vwap,
            upper_band,
            lower_band,
            trend_slope,
            "signals updated"
        );

        Some(signals)
    }

    fn record_spread(&mut self) {
        let primary = &self.series[Instrument::Primary.index()].signals;
        let hedge = &self.series[Instrument::Hedge.index()].signals;
        if let (Some(p), Some(h)) = (primary, hedge) {
            self.spread.push(p.mid - h.mid);
        }
    }

    /// Latest signals for an instrument, if any sample was ever accepted
    pub fn signals(&self, instrument: Instrument) -> Option<&Signals> {
        self.series[instrument.index()].signals.as_ref()
    }

    /// Samples currently held in an instrument's window
    pub fn window_len(&self, instrument: Instrument) -> usize {
        self.series[instrument.index()].samples.len()
    }

    /// Spread between the two mids, once both instruments have traded
    pub fn pair_spread(&self) -> Option<PairSpread> {
        let spread = self.spread.last()?;
        Some(PairSpread {
            spread,
            stddev: math::stddev_milli(self.spread.iter()) / MILLI,
            observations: self.spread.len(),
        })
    }

    /// Reset the reversal latches, e.g. after acting on a reversal
    pub fn clear_reversal(&mut self, instrument: Instrument) {
        let series = &mut self.series[instrument.index()];
        series.latch.clear();
        if let Some(signals) = series.signals.as_mut() {
            signals.reversal = Reversal::None;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(&self.config);
    }
}

/// `(band[t] - band[t - lag + 1]) / lag` in thousandths, once `lag` points exist
///
/// The divisor is the point count, not the distance between the two
/// points; the tuned thresholds were fitted against this form.
fn band_slope_milli(bands: &RollingWindow<Cents>, lag: usize) -> Option<i64> {
    let lag = lag.max(1);
    let newest = bands.from_end(0)?;
    let oldest = bands.from_end(lag - 1)?;
    Some(floor_div((newest - oldest) * MILLI, lag as i64))
}
