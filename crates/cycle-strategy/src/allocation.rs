//! Allocation guidance per market-cycle phase.

use analysis_core::MarketCyclePhase;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Portfolio weights in percent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
    pub equities: f64,
    pub bonds: f64,
    pub cash: f64,
    pub alternatives: f64,
}

impl AssetAllocation {
    const fn new(equities: f64, bonds: f64, cash: f64, alternatives: f64) -> Self {
        Self {
            equities,
            bonds,
            cash,
            alternatives,
        }
    }

    /// Field-by-field sum with an adjustment delta
    pub fn with_adjustment(&self, delta: &AssetAllocation) -> Self {
        Self {
            equities: self.equities + delta.equities,
            bonds: self.bonds + delta.bonds,
            cash: self.cash + delta.cash,
            alternatives: self.alternatives + delta.alternatives,
        }
    }

    pub fn total(&self) -> f64 {
        self.equities + self.bonds + self.cash + self.alternatives
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRecommendation {
    /// Phase the guidance was taken from
    pub phase: MarketCyclePhase,
    pub is_overvalued: bool,
    /// Allocation to hold, adjustment included
    pub allocation: AssetAllocation,
    pub base_allocation: AssetAllocation,
    /// Delta applied when the market is overvalued
    pub adjustment: Option<AssetAllocation>,
    pub preferred_sectors: Vec<String>,
    pub factor_tilts: Vec<String>,
}

struct PhaseGuidance {
    base: AssetAllocation,
    overvalued_delta: AssetAllocation,
    sectors: &'static [&'static str],
    tilts: &'static [&'static str],
}

fn guidance(phase: MarketCyclePhase) -> PhaseGuidance {
    match phase {
        MarketCyclePhase::EarlyExpansion => PhaseGuidance {
            base: AssetAllocation::new(70.0, 20.0, 5.0, 5.0),
            overvalued_delta: AssetAllocation::new(-10.0, 5.0, 5.0, 0.0),
            sectors: &["Financials", "Consumer Discretionary", "Industrials", "Real Estate"],
            tilts: &["Value", "Small Size", "High Beta"],
        },
        MarketCyclePhase::MidExpansion => PhaseGuidance {
            base: AssetAllocation::new(65.0, 25.0, 5.0, 5.0),
            overvalued_delta: AssetAllocation::new(-10.0, 5.0, 5.0, 0.0),
            sectors: &["Technology", "Industrials", "Materials"],
            tilts: &["Momentum", "Quality", "Growth"],
        },
        MarketCyclePhase::LateExpansion => PhaseGuidance {
            base: AssetAllocation::new(55.0, 25.0, 10.0, 10.0),
            overvalued_delta: AssetAllocation::new(-15.0, 5.0, 5.0, 5.0),
            sectors: &["Energy", "Materials", "Healthcare"],
            tilts: &["Quality", "Low Volatility", "Value"],
        },
        MarketCyclePhase::EarlyContraction => PhaseGuidance {
            base: AssetAllocation::new(40.0, 40.0, 15.0, 5.0),
            overvalued_delta: AssetAllocation::new(-10.0, 5.0, 5.0, 0.0),
            sectors: &["Consumer Staples", "Utilities", "Healthcare"],
            tilts: &["Low Volatility", "Quality", "Dividend Yield"],
        },
        MarketCyclePhase::LateContraction => PhaseGuidance {
            base: AssetAllocation::new(50.0, 35.0, 10.0, 5.0),
            overvalued_delta: AssetAllocation::new(-5.0, 0.0, 5.0, 0.0),
            sectors: &["Financials", "Consumer Discretionary", "Technology"],
            tilts: &["Value", "Small Size", "Momentum"],
        },
    }
}

/// Allocation, sector and factor guidance for a market phase key.
///
/// Unrecognized keys use the Late Expansion guidance for both the base
/// allocation and the overvaluation delta.
pub fn strategy_recommendations(phase_key: &str, is_overvalued: bool) -> StrategyRecommendation {
    let phase = phase_key.parse::<MarketCyclePhase>().unwrap_or_else(|e| {
        warn!("{}; using Late Expansion guidance", e);
        MarketCyclePhase::LateExpansion
    });
    let g = guidance(phase);

    let adjustment = is_overvalued.then_some(g.overvalued_delta);
    let allocation = match &adjustment {
        Some(delta) => g.base.with_adjustment(delta),
        None => g.base,
    };

    StrategyRecommendation {
        phase,
        is_overvalued,
        allocation,
        base_allocation: g.base,
        adjustment,
        preferred_sectors: g.sectors.iter().map(|s| s.to_string()).collect(),
        factor_tilts: g.tilts.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overvalued_delta_applied_field_by_field() {
        let rec = strategy_recommendations("Late Contraction", true);
        let delta = rec.adjustment.unwrap();

        assert_eq!(rec.phase, MarketCyclePhase::LateContraction);
        assert_eq!(rec.allocation.equities, rec.base_allocation.equities + delta.equities);
        assert_eq!(rec.allocation.bonds, rec.base_allocation.bonds + delta.bonds);
        assert_eq!(rec.allocation.cash, rec.base_allocation.cash + delta.cash);
        assert_eq!(
            rec.allocation.alternatives,
            rec.base_allocation.alternatives + delta.alternatives
        );
        assert_eq!(rec.allocation, AssetAllocation::new(45.0, 35.0, 15.0, 5.0));
    }

    #[test]
    fn test_not_overvalued_keeps_base() {
        let rec = strategy_recommendations("Early Expansion", false);
        assert!(rec.adjustment.is_none());
        assert_eq!(rec.allocation, rec.base_allocation);
        assert_eq!(rec.preferred_sectors[0], "Financials");
    }

    #[test]
    fn test_unknown_phase_uses_late_expansion() {
        let fallback = strategy_recommendations("Recession?", true);
        let late = strategy_recommendations("Late Expansion", true);

        assert_eq!(fallback.phase, MarketCyclePhase::LateExpansion);
        assert_eq!(fallback.allocation, late.allocation);
        assert_eq!(fallback.adjustment, late.adjustment);
        assert_eq!(fallback.factor_tilts, late.factor_tilts);
    }

    #[test]
    fn test_allocations_stay_fully_invested() {
        for phase in MarketCyclePhase::ALL {
            for overvalued in [false, true] {
                let rec = strategy_recommendations(phase.name(), overvalued);
                assert_eq!(rec.allocation.total(), 100.0);
            }
        }
    }
}
