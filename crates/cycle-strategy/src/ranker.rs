//! Opportunity Ranking Module
//!
//! Ranks companies by how well their own cycle position fits the strategy
//! of the current market phase.

use analysis_core::{CyclePhase, CyclicalityCategory, MarketCyclePhase};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::profiles::StrategyProfile;

/// Score used for a missing value or quality score
const NEUTRAL_SCORE: f64 = 50.0;

/// A company annotated by the earlier analysis stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleCandidate {
    pub symbol: String,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub cyclicality_category: Option<CyclicalityCategory>,
    #[serde(default)]
    pub current_phase: Option<CyclePhase>,
    #[serde(default)]
    pub value_score: Option<f64>,
    #[serde(default)]
    pub quality_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredOpportunity {
    #[serde(flatten)]
    pub candidate: CycleCandidate,
    /// 0-100 fit between the company's cycle profile and the strategy
    pub cyclical_fit: f64,
    pub combined_score: f64,
}

/// Ranked candidates together with the strategy that ranked them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclicalRanking {
    /// `None` when the phase key was not recognized
    pub phase: Option<MarketCyclePhase>,
    pub strategy: StrategyProfile,
    pub opportunities: Vec<ScoredOpportunity>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpportunityRanker;

impl OpportunityRanker {
    pub fn new() -> Self {
        Self
    }

    /// Score every candidate against the strategy for `phase_key` and sort
    /// by combined score, highest first. Candidates are never dropped and
    /// equal scores keep their input order.
    pub fn find_cyclical_opportunities(&self, phase_key: &str, candidates: &[CycleCandidate]) -> CyclicalRanking {
        let (phase, strategy) = StrategyProfile::for_key(phase_key);

        let mut opportunities: Vec<ScoredOpportunity> = candidates
            .iter()
            .map(|candidate| self.score_candidate(&strategy, candidate))
            .collect();

        // stable: ties stay in input order
        opportunities.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!("Ranked {} candidates for {:?}", opportunities.len(), phase);

        CyclicalRanking {
            phase,
            strategy,
            opportunities,
        }
    }

    fn score_candidate(&self, strategy: &StrategyProfile, candidate: &CycleCandidate) -> ScoredOpportunity {
        let fit = cyclical_fit(strategy, candidate.cyclicality_category, candidate.current_phase);
        let combined = candidate.value_score.unwrap_or(NEUTRAL_SCORE) * strategy.value_weight
            + candidate.quality_score.unwrap_or(NEUTRAL_SCORE) * strategy.quality_weight
            + fit * strategy.cyclicality_weight;

        ScoredOpportunity {
            candidate: candidate.clone(),
            cyclical_fit: fit,
            combined_score: combined,
        }
    }
}

/// Fit (0-100) of a company's cycle profile to a strategy. Zero when the
/// category or the phase is unknown.
pub fn cyclical_fit(
    strategy: &StrategyProfile,
    category: Option<CyclicalityCategory>,
    phase: Option<CyclePhase>,
) -> f64 {
    let (Some(category), Some(phase)) = (category, phase) else {
        return 0.0;
    };

    let mut fit: f64 = if category == strategy.target_cyclicality {
        100.0
    } else if Some(category) == strategy.secondary_target {
        70.0
    } else if category == strategy.avoid_category {
        20.0
    } else {
        50.0
    };
    if strategy.preferred_phases.contains(&phase) {
        fit += 20.0;
    }
    fit.min(100.0)
}
