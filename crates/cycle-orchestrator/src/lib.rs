//! Cycle Orchestrator
//!
//! Runs the full screening pipeline: per-company analysis fanned out across
//! a rayon pool, then the cross-sectional sector, relative-value and
//! ranking steps over the joined results.

use analysis_core::{AnalysisError, CyclicalityCategory, EngineConfig, Metric, StockSnapshot};
use chrono::Utc;
use cycle_strategy::{strategy_recommendations, CycleCandidate, OpportunityRanker};
use cyclicality_analysis::{CyclicalityAnalyzer, CyclicalityResult};
use economic_sensitivity::{EconomicSensitivityEstimator, SensitivityProfile};
use rayon::prelude::*;
use relative_valuation::{RelativeValuationScorer, SectorMetrics};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

pub mod report;
pub use report::{ScreenReport, ScreenRequest, StockAnalysis, StockInput};

/// Output of the per-company stage, before any cross-sectional work
struct StockStage {
    snapshot: StockSnapshot,
    cyclicality: CyclicalityResult,
    sensitivity: SensitivityProfile,
    historical_pe_percentile: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CycleScreener {
    config: EngineConfig,
}

impl CycleScreener {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Screen every company in the request.
    ///
    /// Fails only when the request carries an invalid configuration
    /// override. Companies with too little data still appear in the
    /// report, with the affected scores left empty.
    pub fn screen(&self, request: &ScreenRequest) -> Result<ScreenReport, AnalysisError> {
        let config = match &request.config {
            Some(overrides) => overrides.clone().validated()?,
            None => self.config.clone(),
        };

        let cyclicality = CyclicalityAnalyzer::with_config(config.clone());
        let sensitivity = EconomicSensitivityEstimator::with_config(config.clone());
        let valuation = RelativeValuationScorer::with_config(config);

        info!(
            "Screening {} stocks against {} indicators ({})",
            request.stocks.len(),
            request.economic_indicators.len(),
            request.market_phase
        );

        // fan out: each company only needs its own history
        let stages: Vec<StockStage> = request
            .stocks
            .par_iter()
            .map(|stock| {
                let current = stock
                    .history
                    .first()
                    .map(|p| p.ratios.clone())
                    .unwrap_or_default();
                let historical_pe_percentile = current
                    .pe
                    .and_then(|pe| valuation.historical_percentile(&stock.history, Metric::Pe, pe));
                StockStage {
                    snapshot: StockSnapshot {
                        symbol: stock.symbol.clone(),
                        sector: stock.sector.clone(),
                        metrics: current,
                    },
                    cyclicality: cyclicality.analyze_default(&stock.history),
                    sensitivity: sensitivity.analyze_profile(&stock.history, &request.economic_indicators),
                    historical_pe_percentile,
                }
            })
            .collect();

        // fan in
        let snapshots: Vec<StockSnapshot> = stages.iter().map(|s| s.snapshot.clone()).collect();
        let sector_names: BTreeSet<&str> = snapshots.iter().map(|s| s.sector.as_str()).collect();
        let sectors: BTreeMap<&str, SectorMetrics> = sector_names
            .into_iter()
            .map(|name| (name, valuation.sector_metrics(name, &snapshots, &request.market)))
            .collect();

        let stocks: Vec<StockAnalysis> = stages
            .into_par_iter()
            .map(|stage| {
                let peers: Vec<StockSnapshot> = snapshots
                    .iter()
                    .filter(|s| s.sector == stage.snapshot.sector)
                    .cloned()
                    .collect();
                let snapshot = &stage.snapshot;
                StockAnalysis {
                    symbol: snapshot.symbol.clone(),
                    sector: snapshot.sector.clone(),
                    peer_comparison: valuation.compare_to_peers(snapshot, &peers),
                    market_comparison: valuation.compare_to_market(snapshot, &request.market),
                    sector_comparison: sectors
                        .get(snapshot.sector.as_str())
                        .map(|m| valuation.compare_to_sector(snapshot, m)),
                    relative_valuation_score: valuation.relative_valuation_score(snapshot, &peers),
                    quality_score: valuation.quality_score(&snapshot.metrics),
                    historical_pe_percentile: stage.historical_pe_percentile,
                    cyclicality: stage.cyclicality,
                    sensitivity: stage.sensitivity,
                }
            })
            .collect();

        let relative_value_opportunities =
            valuation.find_relative_value_opportunities(&snapshots, &request.market, None);

        let candidates: Vec<CycleCandidate> = stocks.iter().map(candidate_from).collect();
        let ranking = OpportunityRanker::new().find_cyclical_opportunities(&request.market_phase, &candidates);
        let recommendation = strategy_recommendations(&request.market_phase, request.market_overvalued);

        info!(
            "Screen complete: {} stocks, {} sectors, {} relative-value picks",
            stocks.len(),
            sectors.len(),
            relative_value_opportunities.len()
        );

        Ok(ScreenReport {
            generated_at: Utc::now(),
            market_phase: ranking.phase,
            stocks,
            sectors: sectors.into_values().collect(),
            relative_value_opportunities,
            ranking,
            recommendation,
        })
    }
}

/// A cyclicality result that failed for lack of data carries no labels for
/// the ranker, so the candidate gets no cyclical fit. A successful result
/// keeps its category even when the phase is indeterminate; that phase is
/// never a preferred one, so the fit is the plain category bucket.
fn candidate_from(analysis: &StockAnalysis) -> CycleCandidate {
    let cyclicality = &analysis.cyclicality;
    let (category, phase) = if cyclicality.error.is_some() {
        (None, None)
    } else {
        (
            Some(cyclicality.cyclicality_category).filter(|c| *c != CyclicalityCategory::Unknown),
            Some(cyclicality.current_phase),
        )
    };

    CycleCandidate {
        symbol: analysis.symbol.clone(),
        sector: Some(analysis.sector.clone()),
        cyclicality_category: category,
        current_phase: phase,
        value_score: analysis.relative_valuation_score,
        quality_score: analysis.quality_score,
    }
}
