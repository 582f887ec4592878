//! Economic Sensitivity
//!
//! Estimates how a company's fundamentals move with an external economic
//! indicator: correlation, beta on percentage changes, and the lag at which
//! the two series line up best.

use analysis_core::{
    stats, AnalysisError, EconomicIndicatorPoint, EngineConfig, FinancialPeriod, SensitivityCategory,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityResult {
    /// 0-100, `|beta| * 20` capped
    pub sensitivity_score: Option<f64>,
    /// Pearson correlation of the matched levels (-1 to 1)
    pub correlation: Option<f64>,
    pub beta: Option<f64>,
    /// Periods by which the financial series trails the indicator
    pub optimal_lag: usize,
    /// Correlation measured at `optimal_lag`
    pub lag_correlation: Option<f64>,
    pub sensitivity_category: SensitivityCategory,
    pub matched_points: usize,
    pub error: Option<String>,
}

impl SensitivityResult {
    fn insufficient(matched_points: usize, error: AnalysisError) -> Self {
        Self {
            sensitivity_score: None,
            correlation: None,
            beta: None,
            optimal_lag: 0,
            lag_correlation: None,
            sensitivity_category: SensitivityCategory::Unknown,
            matched_points,
            error: Some(error.to_string()),
        }
    }
}

/// Sensitivity of one company against several named indicators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityProfile {
    pub results: BTreeMap<String, SensitivityResult>,
    /// Indicator with the highest sensitivity score, if any scored
    pub most_sensitive: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct EconomicSensitivityEstimator {
    config: EngineConfig,
}

impl EconomicSensitivityEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Measure a history against one indicator series.
    ///
    /// Each period contributes its earnings, or its revenue when earnings
    /// are missing or zero; periods with neither are dropped. Periods and
    /// indicator points are joined on exact date equality.
    pub fn analyze(&self, periods: &[FinancialPeriod], indicator: &[EconomicIndicatorPoint]) -> SensitivityResult {
        let (financial, economic) = match_by_date(periods, indicator);
        let matched = financial.len();

        if matched < self.config.min_periods {
            warn!(
                "Sensitivity skipped: {} date-matched points (need {})",
                matched, self.config.min_periods
            );
            return SensitivityResult::insufficient(
                matched,
                AnalysisError::InsufficientData(format!(
                    "{} date-matched points, at least {} required",
                    matched, self.config.min_periods
                )),
            );
        }

        let correlation = stats::correlation(&financial, &economic);
        let beta = stats::beta(&financial, &economic);
        let (optimal_lag, lag_correlation) = optimal_lag(&financial, &economic, self.config.max_lag);

        let sensitivity_score = beta.map(|b| (b.abs() * 20.0).round().min(100.0));
        let sensitivity_category = sensitivity_score
            .map(SensitivityCategory::from_score)
            .unwrap_or(SensitivityCategory::Unknown);

        debug!(
            "Sensitivity over {} points: corr={:?} beta={:?} lag={}",
            matched, correlation, beta, optimal_lag
        );

        SensitivityResult {
            sensitivity_score,
            correlation,
            beta,
            optimal_lag,
            lag_correlation,
            sensitivity_category,
            matched_points: matched,
            error: None,
        }
    }

    /// Measure a history against several indicators at once
    pub fn analyze_profile(
        &self,
        periods: &[FinancialPeriod],
        indicators: &BTreeMap<String, Vec<EconomicIndicatorPoint>>,
    ) -> SensitivityProfile {
        let results: BTreeMap<String, SensitivityResult> = indicators
            .iter()
            .map(|(name, series)| (name.clone(), self.analyze(periods, series)))
            .collect();

        let mut most_sensitive: Option<(&String, f64)> = None;
        for (name, result) in &results {
            if let Some(score) = result.sensitivity_score {
                if most_sensitive.map_or(true, |(_, best)| score > best) {
                    most_sensitive = Some((name, score));
                }
            }
        }

        SensitivityProfile {
            most_sensitive: most_sensitive.map(|(name, _)| name.clone()),
            results,
        }
    }
}

/// Inner join on date, keeping the period order. The first indicator
/// point wins when a date repeats.
///
/// A period contributes its earnings, or its revenue when earnings are
/// missing or zero. Periods where both are missing or zero are dropped.
fn match_by_date(periods: &[FinancialPeriod], indicator: &[EconomicIndicatorPoint]) -> (Vec<f64>, Vec<f64>) {
    let by_date: HashMap<_, f64> = indicator.iter().rev().map(|p| (p.date, p.value)).collect();

    periods
        .iter()
        .filter_map(|p| {
            let value = p
                .earnings
                .filter(|e| *e != 0.0)
                .or(p.revenue.filter(|r| *r != 0.0))?;
            let economic = by_date.get(&p.date)?;
            Some((value, *economic))
        })
        .unzip()
}

/// Search lags `0..=max_lag` for the strongest correlation between
/// `financial[..len - lag]` and `indicator[lag..]`.
///
/// Only a strictly greater correlation replaces the current best, so ties
/// resolve to the smallest lag. Returns lag 0 when either series is not
/// longer than `max_lag` or no lag has a defined correlation.
pub fn optimal_lag(financial: &[f64], indicator: &[f64], max_lag: usize) -> (usize, Option<f64>) {
    if financial.len() <= max_lag || indicator.len() <= max_lag {
        return (0, None);
    }

    let mut best: Option<(usize, f64)> = None;
    for lag in 0..=max_lag {
        let lagged_financial = &financial[..financial.len() - lag];
        let lagged_indicator = &indicator[lag..];
        let n = lagged_financial.len().min(lagged_indicator.len());

        if let Some(corr) = stats::correlation(&lagged_financial[..n], &lagged_indicator[..n]) {
            if best.map_or(true, |(_, b)| corr > b) {
                best = Some((lag, corr));
            }
        }
    }

    match best {
        Some((lag, corr)) => (lag, Some(corr)),
        None => (0, None),
    }
}
