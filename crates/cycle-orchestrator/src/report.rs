use analysis_core::{
    EconomicIndicatorPoint, EngineConfig, FinancialPeriod, MarketCyclePhase, ValuationMetrics,
};
use chrono::{DateTime, Utc};
use cycle_strategy::{CyclicalRanking, StrategyRecommendation};
use cyclicality_analysis::CyclicalityResult;
use economic_sensitivity::SensitivityProfile;
use relative_valuation::{RelativeComparison, RelativeValueOpportunity, SectorMetrics};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One company to screen: its sector and a most-recent-first history.
/// The ratios of the newest period are taken as the current snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInput {
    pub symbol: String,
    pub sector: String,
    #[serde(default)]
    pub history: Vec<FinancialPeriod>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenRequest {
    /// Display key of the market phase, e.g. "Mid Expansion"
    pub market_phase: String,
    #[serde(default)]
    pub market_overvalued: bool,
    /// Market-wide ratios used for sector attractiveness
    #[serde(default)]
    pub market: ValuationMetrics,
    /// Named economic indicator series, e.g. "gdp" or "industrialProduction"
    #[serde(default)]
    pub economic_indicators: BTreeMap<String, Vec<EconomicIndicatorPoint>>,
    pub stocks: Vec<StockInput>,
    /// Replaces the screener's configuration for this request
    #[serde(default)]
    pub config: Option<EngineConfig>,
}

/// Everything computed for one company
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAnalysis {
    pub symbol: String,
    pub sector: String,
    pub cyclicality: CyclicalityResult,
    pub sensitivity: SensitivityProfile,
    /// Where the current PE sits within the company's own history
    pub historical_pe_percentile: Option<f64>,
    pub peer_comparison: RelativeComparison,
    pub market_comparison: RelativeComparison,
    pub sector_comparison: Option<RelativeComparison>,
    pub relative_valuation_score: Option<f64>,
    pub quality_score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenReport {
    pub generated_at: DateTime<Utc>,
    /// `None` when the requested phase key was not recognized
    pub market_phase: Option<MarketCyclePhase>,
    /// In request order
    pub stocks: Vec<StockAnalysis>,
    /// In sector-name order
    pub sectors: Vec<SectorMetrics>,
    pub relative_value_opportunities: Vec<RelativeValueOpportunity>,
    pub ranking: CyclicalRanking,
    pub recommendation: StrategyRecommendation,
}

impl ScreenReport {
    pub fn stock(&self, symbol: &str) -> Option<&StockAnalysis> {
        self.stocks.iter().find(|s| s.symbol == symbol)
    }
}
