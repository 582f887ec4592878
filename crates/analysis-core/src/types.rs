use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AnalysisError;

/// Ratio fields reported for a fiscal period or a current snapshot.
/// Absence means "not reported".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationMetrics {
    #[serde(default)]
    pub pe: Option<f64>,
    #[serde(default)]
    pub pb: Option<f64>,
    #[serde(default)]
    pub ev_to_ebitda: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub free_cash_flow_yield: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub roic: Option<f64>,
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    #[serde(default)]
    pub interest_coverage: Option<f64>,
}

impl ValuationMetrics {
    /// Value of a ratio metric. Flow metrics (earnings, revenue, margins)
    /// are not part of a ratio snapshot and always return `None`.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Pe => self.pe,
            Metric::Pb => self.pb,
            Metric::EvToEbitda => self.ev_to_ebitda,
            Metric::DividendYield => self.dividend_yield,
            Metric::FreeCashFlowYield => self.free_cash_flow_yield,
            Metric::Roe => self.roe,
            Metric::Roic => self.roic,
            Metric::DebtToEquity => self.debt_to_equity,
            Metric::InterestCoverage => self.interest_coverage,
            Metric::Earnings | Metric::Revenue | Metric::Margins => None,
        }
    }
}

/// One fiscal period of company fundamentals.
///
/// Histories are ordered most-recent-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialPeriod {
    pub date: NaiveDate,
    #[serde(default)]
    pub earnings: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub margins: Option<f64>,
    #[serde(flatten)]
    pub ratios: ValuationMetrics,
}

impl FinancialPeriod {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            earnings: None,
            revenue: None,
            margins: None,
            ratios: ValuationMetrics::default(),
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Earnings => self.earnings,
            Metric::Revenue => self.revenue,
            Metric::Margins => self.margins,
            other => self.ratios.get(other),
        }
    }
}

/// A dated observation of an external economic indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicIndicatorPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Current state of a listed company, as used for cross-sectional comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub symbol: String,
    pub sector: String,
    #[serde(default)]
    pub metrics: ValuationMetrics,
}

/// Numeric field of a [`FinancialPeriod`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Earnings,
    Revenue,
    Margins,
    Pe,
    Pb,
    EvToEbitda,
    DividendYield,
    FreeCashFlowYield,
    Roe,
    Roic,
    DebtToEquity,
    InterestCoverage,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::Earnings,
        Metric::Revenue,
        Metric::Margins,
        Metric::Pe,
        Metric::Pb,
        Metric::EvToEbitda,
        Metric::DividendYield,
        Metric::FreeCashFlowYield,
        Metric::Roe,
        Metric::Roic,
        Metric::DebtToEquity,
        Metric::InterestCoverage,
    ];

    /// Ratio metrics compared across peers and sectors
    pub const VALUATION: [Metric; 9] = [
        Metric::Pe,
        Metric::Pb,
        Metric::EvToEbitda,
        Metric::DividendYield,
        Metric::FreeCashFlowYield,
        Metric::Roe,
        Metric::Roic,
        Metric::DebtToEquity,
        Metric::InterestCoverage,
    ];

    /// Field name as it appears in serialized records
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Earnings => "earnings",
            Metric::Revenue => "revenue",
            Metric::Margins => "margins",
            Metric::Pe => "pe",
            Metric::Pb => "pb",
            Metric::EvToEbitda => "evToEbitda",
            Metric::DividendYield => "dividendYield",
            Metric::FreeCashFlowYield => "freeCashFlowYield",
            Metric::Roe => "roe",
            Metric::Roic => "roic",
            Metric::DebtToEquity => "debtToEquity",
            Metric::InterestCoverage => "interestCoverage",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Metric {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.key() == s)
            .ok_or_else(|| AnalysisError::UnrecognizedKey(format!("metric '{}'", s)))
    }
}

/// How strongly a company's fundamentals swing with the business cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CyclicalityCategory {
    Unknown,
    Defensive,
    ModerateCyclicality,
    Cyclical,
    HighlyCyclical,
}

impl CyclicalityCategory {
    /// Classify a 0-100 cyclicality score
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 15.0 => CyclicalityCategory::Defensive,
            s if s < 30.0 => CyclicalityCategory::ModerateCyclicality,
            s if s < 50.0 => CyclicalityCategory::Cyclical,
            _ => CyclicalityCategory::HighlyCyclical,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CyclicalityCategory::Unknown => "Unknown",
            CyclicalityCategory::Defensive => "Defensive",
            CyclicalityCategory::ModerateCyclicality => "Moderate Cyclicality",
            CyclicalityCategory::Cyclical => "Cyclical",
            CyclicalityCategory::HighlyCyclical => "Highly Cyclical",
        }
    }
}

/// Where a single company sits in its own business cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CyclePhase {
    Indeterminate,
    EarlyExpansion,
    LateExpansion,
    EarlyContraction,
    LateContraction,
    EarlyRecovery,
    LateCyclePeak,
    MixedSignals,
}

impl CyclePhase {
    pub fn name(&self) -> &'static str {
        match self {
            CyclePhase::Indeterminate => "Indeterminate",
            CyclePhase::EarlyExpansion => "Early Expansion",
            CyclePhase::LateExpansion => "Late Expansion",
            CyclePhase::EarlyContraction => "Early Contraction",
            CyclePhase::LateContraction => "Late Contraction",
            CyclePhase::EarlyRecovery => "Early Recovery",
            CyclePhase::LateCyclePeak => "Late Cycle Peak",
            CyclePhase::MixedSignals => "Mixed Signals",
        }
    }
}

/// Sensitivity of fundamentals to an economic indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensitivityCategory {
    Unknown,
    DefensiveCounterCyclical,
    ModerateSensitivity,
    AverageCyclicality,
    HighlyCyclical,
    ExtremeCyclicality,
}

impl SensitivityCategory {
    /// Classify a 0-100 sensitivity score
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 20.0 => SensitivityCategory::DefensiveCounterCyclical,
            s if s < 40.0 => SensitivityCategory::ModerateSensitivity,
            s if s < 60.0 => SensitivityCategory::AverageCyclicality,
            s if s < 80.0 => SensitivityCategory::HighlyCyclical,
            _ => SensitivityCategory::ExtremeCyclicality,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SensitivityCategory::Unknown => "Unknown",
            SensitivityCategory::DefensiveCounterCyclical => "Defensive/Counter-Cyclical",
            SensitivityCategory::ModerateSensitivity => "Moderate Sensitivity",
            SensitivityCategory::AverageCyclicality => "Average Cyclicality",
            SensitivityCategory::HighlyCyclical => "Highly Cyclical",
            SensitivityCategory::ExtremeCyclicality => "Extreme Cyclicality",
        }
    }
}

/// Phase of the broad market cycle, used to pick a scoring strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketCyclePhase {
    EarlyExpansion,
    MidExpansion,
    LateExpansion,
    EarlyContraction,
    LateContraction,
}

impl MarketCyclePhase {
    pub const ALL: [MarketCyclePhase; 5] = [
        MarketCyclePhase::EarlyExpansion,
        MarketCyclePhase::MidExpansion,
        MarketCyclePhase::LateExpansion,
        MarketCyclePhase::EarlyContraction,
        MarketCyclePhase::LateContraction,
    ];

    /// Display key, e.g. "Early Expansion"
    pub fn name(&self) -> &'static str {
        match self {
            MarketCyclePhase::EarlyExpansion => "Early Expansion",
            MarketCyclePhase::MidExpansion => "Mid Expansion",
            MarketCyclePhase::LateExpansion => "Late Expansion",
            MarketCyclePhase::EarlyContraction => "Early Contraction",
            MarketCyclePhase::LateContraction => "Late Contraction",
        }
    }
}

impl fmt::Display for MarketCyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MarketCyclePhase {
    type Err = AnalysisError;

    /// Exact match on the display key; no case folding or trimming.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MarketCyclePhase::ALL
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| AnalysisError::UnrecognizedKey(format!("market cycle phase '{}'", s)))
    }
}
