//! Relative Valuation
//!
//! Scores a company against its own history, its sector peers and the
//! broad market, and screens sectors for relative-value opportunities.

pub mod comparison;
pub mod discovery;
pub mod models;
pub mod scoring;

pub use models::{
    ComparisonBasis, MetricComparison, RelativeComparison, RelativeValueOpportunity,
    SectorMetricSummary, SectorMetrics,
};
pub use scoring::{Direction, FactorAccumulator, ValuationFactor};

use analysis_core::EngineConfig;

/// Entry point for every relative-valuation operation. Holds no state
/// besides its configuration.
#[derive(Debug, Clone, Default)]
pub struct RelativeValuationScorer {
    config: EngineConfig,
}

impl RelativeValuationScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
