//! Cyclicality Analysis
//!
//! Measures how strongly a company's fundamentals swing over time and
//! places its most recent periods in a business-cycle phase.

use analysis_core::{
    stats, AnalysisError, CyclePhase, CyclicalityCategory, EngineConfig, FinancialPeriod, Metric,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Indicators analyzed when the caller does not pick any
pub const DEFAULT_INDICATORS: [Metric; 3] = [Metric::Earnings, Metric::Revenue, Metric::Margins];

/// Periods on each side of the recent-vs-previous comparison
const PHASE_HALF: usize = 4;

/// Dispersion of one indicator over the analyzed history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorMetrics {
    pub mean: f64,
    pub std_dev: f64,
    pub coefficient_of_variation: f64,
    pub sample_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarginTrend {
    Expanding,
    Contracting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthTrend {
    Accelerating,
    Decelerating,
}

/// Signals the phase classification is based on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleTrends {
    pub margins: MarginTrend,
    pub earnings: GrowthTrend,
    pub revenue: GrowthTrend,
    /// Most recent earnings as a percentage of the historical maximum
    pub percent_of_peak: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclicalityResult {
    /// 0-100, higher means more cyclical
    pub cyclicality_score: Option<f64>,
    pub cyclicality_category: CyclicalityCategory,
    pub current_phase: CyclePhase,
    /// Standard deviation of period-over-period earnings growth (%)
    pub volatility: Option<f64>,
    pub indicator_metrics: BTreeMap<Metric, IndicatorMetrics>,
    pub trends: Option<CycleTrends>,
    pub periods_analyzed: usize,
    pub error: Option<String>,
}

impl CyclicalityResult {
    fn insufficient(periods_analyzed: usize, error: AnalysisError) -> Self {
        Self {
            cyclicality_score: None,
            cyclicality_category: CyclicalityCategory::Unknown,
            current_phase: CyclePhase::Indeterminate,
            volatility: None,
            indicator_metrics: BTreeMap::new(),
            trends: None,
            periods_analyzed,
            error: Some(error.to_string()),
        }
    }
}

/// Cyclicality and cycle-phase analyzer
#[derive(Debug, Clone, Default)]
pub struct CyclicalityAnalyzer {
    config: EngineConfig,
}

impl CyclicalityAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Analyze earnings, revenue and margins
    pub fn analyze_default(&self, periods: &[FinancialPeriod]) -> CyclicalityResult {
        self.analyze(periods, &DEFAULT_INDICATORS)
    }

    /// Analyze a most-recent-first history over the given indicators.
    ///
    /// Degraded input never fails: the result carries `None` scores and an
    /// `error` message instead.
    pub fn analyze(&self, periods: &[FinancialPeriod], indicators: &[Metric]) -> CyclicalityResult {
        let min = self.config.min_periods;
        if periods.len() < min {
            warn!("Cyclicality skipped: {} periods (need {})", periods.len(), min);
            return CyclicalityResult::insufficient(
                periods.len(),
                AnalysisError::InsufficientData(format!(
                    "{} periods available, at least {} required",
                    periods.len(),
                    min
                )),
            );
        }

        let mut indicator_metrics = BTreeMap::new();
        for &indicator in indicators {
            let values: Vec<f64> = periods.iter().filter_map(|p| p.value(indicator)).collect();
            if values.len() < min {
                debug!("Skipping {}: {} reported values (need {})", indicator, values.len(), min);
                continue;
            }
            match indicator_dispersion(&values) {
                Some(metrics) => {
                    indicator_metrics.insert(indicator, metrics);
                }
                None => debug!("Skipping {}: coefficient of variation undefined", indicator),
            }
        }

        if indicator_metrics.is_empty() {
            return CyclicalityResult::insufficient(
                periods.len(),
                AnalysisError::InsufficientData(format!(
                    "no indicator has {} usable values",
                    min
                )),
            );
        }

        let avg_cv = indicator_metrics
            .values()
            .map(|m| m.coefficient_of_variation)
            .sum::<f64>()
            / indicator_metrics.len() as f64;
        let score = (avg_cv * 2.0).round().clamp(0.0, 100.0);

        let trends = cycle_trends(periods);
        let current_phase = trends.map(|t| classify_phase(&t)).unwrap_or(CyclePhase::Indeterminate);

        CyclicalityResult {
            cyclicality_score: Some(score),
            cyclicality_category: CyclicalityCategory::from_score(score),
            current_phase,
            volatility: earnings_volatility(periods),
            indicator_metrics,
            trends,
            periods_analyzed: periods.len(),
            error: None,
        }
    }
}

fn indicator_dispersion(values: &[f64]) -> Option<IndicatorMetrics> {
    Some(IndicatorMetrics {
        mean: stats::mean(values)?,
        std_dev: stats::std_dev(values)?,
        coefficient_of_variation: stats::coefficient_of_variation(values)?,
        sample_size: values.len(),
    })
}

/// Compare the four most recent periods with the four before them.
/// Returns `None` when either window lacks the data for one of the trends.
pub fn cycle_trends(periods: &[FinancialPeriod]) -> Option<CycleTrends> {
    if periods.len() < PHASE_HALF * 2 {
        return None;
    }
    let recent = &periods[..PHASE_HALF];
    let previous = &periods[PHASE_HALF..PHASE_HALF * 2];

    let margins = if window_mean(recent, Metric::Margins)? > window_mean(previous, Metric::Margins)? {
        MarginTrend::Expanding
    } else {
        MarginTrend::Contracting
    };

    Some(CycleTrends {
        margins,
        earnings: growth_trend(recent, previous, Metric::Earnings)?,
        revenue: growth_trend(recent, previous, Metric::Revenue)?,
        percent_of_peak: percent_of_peak(periods),
    })
}

/// Map trends to a phase. Conditions are checked in a fixed order and the
/// first match wins.
pub fn classify_phase(trends: &CycleTrends) -> CyclePhase {
    use GrowthTrend::*;
    use MarginTrend::*;

    let below_peak = |limit: f64| trends.percent_of_peak.is_some_and(|p| p < limit);
    let near_peak = |limit: f64| trends.percent_of_peak.is_some_and(|p| p > limit);

    match (trends.margins, trends.earnings, trends.revenue) {
        (Expanding, Accelerating, Accelerating) => {
            if below_peak(90.0) {
                CyclePhase::EarlyExpansion
            } else {
                CyclePhase::LateExpansion
            }
        }
        (Contracting, Decelerating, _) | (Contracting, _, Decelerating) => {
            if near_peak(75.0) {
                CyclePhase::EarlyContraction
            } else {
                CyclePhase::LateContraction
            }
        }
        (Contracting, Accelerating, _) => CyclePhase::EarlyRecovery,
        (Expanding, Decelerating, _) => CyclePhase::LateCyclePeak,
        _ => CyclePhase::MixedSignals,
    }
}

fn window_mean(window: &[FinancialPeriod], metric: Metric) -> Option<f64> {
    let values: Vec<f64> = window.iter().filter_map(|p| p.value(metric)).collect();
    stats::mean(&values)
}

fn growth_trend(recent: &[FinancialPeriod], previous: &[FinancialPeriod], metric: Metric) -> Option<GrowthTrend> {
    let avg_growth = |window: &[FinancialPeriod]| {
        let values: Vec<f64> = window.iter().filter_map(|p| p.value(metric)).collect();
        stats::mean(&stats::growth_rates(&values))
    };
    if avg_growth(recent)? > avg_growth(previous)? {
        Some(GrowthTrend::Accelerating)
    } else {
        Some(GrowthTrend::Decelerating)
    }
}

fn percent_of_peak(periods: &[FinancialPeriod]) -> Option<f64> {
    let current = periods.first()?.earnings?;
    let peak = periods
        .iter()
        .filter_map(|p| p.earnings)
        .fold(f64::NEG_INFINITY, f64::max);
    if peak <= 0.0 {
        return None;
    }
    Some(current / peak * 100.0)
}

/// Standard deviation of period-over-period earnings growth. Steps from a
/// zero or negative prior value are skipped.
pub fn earnings_volatility(periods: &[FinancialPeriod]) -> Option<f64> {
    let earnings: Vec<f64> = periods.iter().filter_map(|p| p.earnings).collect();
    let growth: Vec<f64> = earnings
        .windows(2)
        .filter_map(|w| {
            let (curr, prev) = (w[0], w[1]);
            if prev > 0.0 {
                Some((curr - prev) / prev * 100.0)
            } else {
                None
            }
        })
        .collect();
    stats::std_dev(&growth)
}
