//! Cycle Strategy
//!
//! Regime-conditioned ranking: picks a scoring strategy for the declared
//! market-cycle phase, ranks companies by how well they fit it, and maps
//! the phase to asset-allocation guidance.

pub mod allocation;
pub mod profiles;
pub mod ranker;

pub use allocation::{strategy_recommendations, AssetAllocation, StrategyRecommendation};
pub use profiles::StrategyProfile;
pub use ranker::{CycleCandidate, CyclicalRanking, OpportunityRanker, ScoredOpportunity};
