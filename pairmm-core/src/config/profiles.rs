//! Named configuration profiles
//!
//! Each profile reproduces one tuned quoting setup:
//! - SingleRail: one bid/ask pair around the imbalance mid, hedged per fill
//! - MultiRail: inner and outer rails around the hedge mid, regime-aware hedging
//! - MultiRailPositional: wider rails with inventory-shrunk sizes and amends

use super::types::*;
use rust_decimal_macros::dec;

/// Configuration profile name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileName {
    SingleRail,
    MultiRail,
    MultiRailPositional,
}

impl ProfileName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleRail => "single-rail",
            Self::MultiRail => "multi-rail",
            Self::MultiRailPositional => "multi-rail-positional",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "single" | "single-rail" => Some(Self::SingleRail),
            "multi" | "multi-rail" => Some(Self::MultiRail),
            "positional" | "multi-rail-positional" => Some(Self::MultiRailPositional),
            _ => None,
        }
    }
}

/// Profile constructors
pub struct ConfigProfile;

impl ConfigProfile {
    pub fn by_name(name: ProfileName) -> EngineConfig {
        match name {
            ProfileName::SingleRail => Self::single_rail(),
            ProfileName::MultiRail => Self::multi_rail(),
            ProfileName::MultiRailPositional => Self::multi_rail_positional(),
        }
    }

    /// One rail per side
    ///
    /// - 10-lot orders, limit 100, whole lots only
    /// - Center on the imbalance mid with 0.7 skew, hedge momentum, VWAP trend shift
    /// - Every fill hedged 1:1, no regime detection
    pub fn single_rail() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.statistics.vwap_window = 24;
        config.statistics.trend_window = 5;
        config.quoting = QuotingConfig {
            variant: StrategyVariant::SingleRail,
            anchor: Anchor::ImbalanceMid,
            inventory_skew: dec!(0.7),
            half_spread_ticks: 2,
            trend_gain: 100,
            momentum_enabled: true,
            momentum_decay: dec!(0.6),
            size_policy: SizePolicy::FullLot,
            ..QuotingConfig::default()
        };
        config
    }

    /// Two rails per side around the hedge mid
    ///
    /// - Rails at the spread deviation plus 40 and 100 cents, no skew
    /// - 10/20 lots; the inner lot shrinks to leave room for the outer one
    /// - Regime detection on: drift hedging while Normal, 10-lot tranches while Trending
    pub fn multi_rail() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.instrument.lot_size = 10;
        config.instrument.outer_lot_size = 20;
        config.regime.enabled = true;
        config.quoting = QuotingConfig {
            variant: StrategyVariant::MultiRail,
            inventory_skew: dec!(0),
            momentum_enabled: false,
            trend_gain: 0,
            inner_offset: 40,
            outer_offset: 100,
            size_policy: SizePolicy::Shrink,
            ..QuotingConfig::default()
        };
        config.hedge = HedgeConfig {
            on_fill: true,
            dead_band: Some(5),
            drift_unit: 1,
            trend_enabled: true,
            trend_tranche: 10,
            trend_slope_threshold: 15,
            hedge_limit: 100,
        };
        config
    }

    /// Wide rails with position-proportional sizing
    ///
    /// - 20/60 lots, limit 80, rails at the spread deviation plus 100 and 300 cents
    /// - Skew of one cent per lot held
    /// - Oversized resting orders are amended down as position builds
    pub fn multi_rail_positional() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.instrument.lot_size = 20;
        config.instrument.outer_lot_size = 60;
        config.instrument.position_limit = 80;
        config.quoting = QuotingConfig {
            variant: StrategyVariant::MultiRail,
            // k * tick / limit = 0.8 * 100 / 80 = 1 cent per lot
            inventory_skew: dec!(0.8),
            momentum_enabled: false,
            trend_gain: 0,
            inner_offset: 100,
            outer_offset: 300,
            size_policy: SizePolicy::Shrink,
            amend: true,
            ..QuotingConfig::default()
        };
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_validate() {
        for name in [
            ProfileName::SingleRail,
            ProfileName::MultiRail,
            ProfileName::MultiRailPositional,
        ] {
            let config = ConfigProfile::by_name(name);
            assert!(config.validate().is_ok(), "{} failed validation", name.as_str());
        }
    }

    #[test]
    fn test_profile_name_parsing() {
        assert_eq!(ProfileName::from_str("multi_rail"), Some(ProfileName::MultiRail));
        assert_eq!(ProfileName::from_str("SINGLE"), Some(ProfileName::SingleRail));
        assert_eq!(
            ProfileName::from_str(ProfileName::MultiRailPositional.as_str()),
            Some(ProfileName::MultiRailPositional)
        );
        assert_eq!(ProfileName::from_str("aggressive"), None);
    }

    #[test]
    fn test_positional_skew_is_one_cent_per_lot() {
        let config = ConfigProfile::multi_rail_positional();
        let per_lot = config.quoting.inventory_skew_milli() * config.instrument.tick_size
            / (1_000 * config.instrument.position_limit);
        assert_eq!(per_lot, 1);
    }
}
