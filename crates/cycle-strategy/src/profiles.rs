//! Scoring strategies per market-cycle phase.

use analysis_core::{CyclePhase, CyclicalityCategory, MarketCyclePhase};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// What kind of company a market phase rewards, and how the combined score
/// weighs value, quality and cyclical fit (weights sum to 1.0 by convention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyProfile {
    pub target_cyclicality: CyclicalityCategory,
    pub secondary_target: Option<CyclicalityCategory>,
    pub avoid_category: CyclicalityCategory,
    pub preferred_phases: Vec<CyclePhase>,
    pub value_weight: f64,
    pub quality_weight: f64,
    pub cyclicality_weight: f64,
}

impl Default for StrategyProfile {
    fn default() -> Self {
        Self {
            target_cyclicality: CyclicalityCategory::ModerateCyclicality,
            secondary_target: None,
            avoid_category: CyclicalityCategory::HighlyCyclical,
            preferred_phases: Vec::new(),
            value_weight: 0.4,
            quality_weight: 0.4,
            cyclicality_weight: 0.2,
        }
    }
}

impl StrategyProfile {
    pub fn for_phase(phase: MarketCyclePhase) -> Self {
        use CyclePhase as P;
        use CyclicalityCategory as C;

        match phase {
            MarketCyclePhase::EarlyExpansion => Self {
                target_cyclicality: C::HighlyCyclical,
                secondary_target: Some(C::Cyclical),
                avoid_category: C::Defensive,
                preferred_phases: vec![P::EarlyRecovery, P::EarlyExpansion],
                value_weight: 0.3,
                quality_weight: 0.2,
                cyclicality_weight: 0.5,
            },
            MarketCyclePhase::MidExpansion => Self {
                target_cyclicality: C::Cyclical,
                secondary_target: Some(C::ModerateCyclicality),
                avoid_category: C::Defensive,
                preferred_phases: vec![P::EarlyExpansion, P::LateExpansion],
                value_weight: 0.35,
                quality_weight: 0.3,
                cyclicality_weight: 0.35,
            },
            MarketCyclePhase::LateExpansion => Self {
                target_cyclicality: C::ModerateCyclicality,
                secondary_target: Some(C::Defensive),
                avoid_category: C::HighlyCyclical,
                preferred_phases: vec![P::LateExpansion, P::EarlyExpansion],
                value_weight: 0.3,
                quality_weight: 0.45,
                cyclicality_weight: 0.25,
            },
            MarketCyclePhase::EarlyContraction => Self {
                target_cyclicality: C::Defensive,
                secondary_target: Some(C::ModerateCyclicality),
                avoid_category: C::HighlyCyclical,
                preferred_phases: vec![P::LateContraction, P::EarlyRecovery],
                value_weight: 0.3,
                quality_weight: 0.5,
                cyclicality_weight: 0.2,
            },
            MarketCyclePhase::LateContraction => Self {
                target_cyclicality: C::Cyclical,
                secondary_target: Some(C::HighlyCyclical),
                avoid_category: C::Defensive,
                preferred_phases: vec![P::LateContraction, P::EarlyRecovery],
                value_weight: 0.5,
                quality_weight: 0.2,
                cyclicality_weight: 0.3,
            },
        }
    }

    /// Look up a profile by display key ("Early Expansion", ...). Unknown
    /// keys get the default profile and `None` as the resolved phase.
    pub fn for_key(key: &str) -> (Option<MarketCyclePhase>, Self) {
        match key.parse::<MarketCyclePhase>() {
            Ok(phase) => (Some(phase), Self::for_phase(phase)),
            Err(e) => {
                warn!("{}; using the default strategy profile", e);
                (None, Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weights_sum_to_one() {
        for phase in MarketCyclePhase::ALL {
            let p = StrategyProfile::for_phase(phase);
            assert_relative_eq!(p.value_weight + p.quality_weight + p.cyclicality_weight, 1.0, epsilon = 1e-12);
        }
        let d = StrategyProfile::default();
        assert_relative_eq!(d.value_weight + d.quality_weight + d.cyclicality_weight, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_key_uses_default() {
        let (phase, profile) = StrategyProfile::for_key("Goldilocks");
        assert_eq!(phase, None);
        assert_eq!(profile, StrategyProfile::default());
        assert_eq!(profile.target_cyclicality, CyclicalityCategory::ModerateCyclicality);
        assert_eq!(profile.avoid_category, CyclicalityCategory::HighlyCyclical);

        let (phase, profile) = StrategyProfile::for_key("Early Expansion");
        assert_eq!(phase, Some(MarketCyclePhase::EarlyExpansion));
        assert_eq!(profile.target_cyclicality, CyclicalityCategory::HighlyCyclical);
    }
}
