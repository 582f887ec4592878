//! Composite valuation and quality scores.
//!
//! Every composite is an average over the factors that could be computed:
//! a factor with missing or non-positive inputs is skipped, never scored as
//! zero.

use analysis_core::{stats, Metric, StockSnapshot, ValuationMetrics};
use tracing::debug;

use crate::RelativeValuationScorer;

/// Whether a high metric value is good or bad for the investor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuationFactor {
    pub metric: Metric,
    pub weight: f64,
    pub direction: Direction,
}

impl ValuationFactor {
    const fn new(metric: Metric, weight: f64, direction: Direction) -> Self {
        Self {
            metric,
            weight,
            direction,
        }
    }

    /// Weighted contribution of `value` measured against `reference`.
    ///
    /// Lower-is-better metrics use the inverted ratio. `None` when either
    /// side cannot form a ratio.
    pub fn score(&self, value: Option<f64>, reference: Option<f64>) -> Option<f64> {
        let (value, reference) = (value?, reference?);
        if !value.is_finite() || reference <= 0.0 || !reference.is_finite() {
            return None;
        }
        let ratio = value / reference;
        let score = match self.direction {
            Direction::LowerIsBetter => {
                if ratio <= 0.0 {
                    return None;
                }
                (1.0 / ratio) * self.weight
            }
            Direction::HigherIsBetter => ratio * self.weight,
        };
        Some(score.max(0.0))
    }
}

/// Factors for a company against its sector peers
pub const PEER_VALUATION_FACTORS: [ValuationFactor; 4] = [
    ValuationFactor::new(Metric::Pe, 30.0, Direction::LowerIsBetter),
    ValuationFactor::new(Metric::Pb, 20.0, Direction::LowerIsBetter),
    ValuationFactor::new(Metric::DividendYield, 25.0, Direction::HigherIsBetter),
    ValuationFactor::new(Metric::FreeCashFlowYield, 25.0, Direction::HigherIsBetter),
];

/// Factors for a sector against the market
pub const SECTOR_ATTRACTIVENESS_FACTORS: [ValuationFactor; 4] = [
    ValuationFactor::new(Metric::Pe, 25.0, Direction::LowerIsBetter),
    ValuationFactor::new(Metric::Pb, 25.0, Direction::LowerIsBetter),
    ValuationFactor::new(Metric::DividendYield, 25.0, Direction::HigherIsBetter),
    ValuationFactor::new(Metric::FreeCashFlowYield, 25.0, Direction::HigherIsBetter),
];

const ROE_CURVE: [(f64, f64); 4] = [(0.0, 0.0), (5.0, 25.0), (15.0, 75.0), (25.0, 100.0)];
const ROIC_CURVE: [(f64, f64); 4] = [(0.0, 0.0), (4.0, 25.0), (12.0, 75.0), (20.0, 100.0)];
const DEBT_TO_EQUITY_CURVE: [(f64, f64); 4] = [(0.0, 100.0), (0.5, 75.0), (2.0, 25.0), (4.0, 0.0)];
const INTEREST_COVERAGE_CURVE: [(f64, f64); 4] = [(0.0, 0.0), (2.0, 25.0), (5.0, 75.0), (10.0, 100.0)];

/// Running (sum of factor scores, factor count) pair
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FactorAccumulator {
    total: f64,
    count: usize,
}

impl FactorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a factor score; `None` means the factor did not apply.
    pub fn add(&mut self, score: Option<f64>) {
        if let Some(score) = score.filter(|s| s.is_finite()) {
            self.total += score;
            self.count += 1;
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Average over contributing factors, `None` when nothing contributed
    pub fn average(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.total / self.count as f64)
        }
    }
}

/// Quality points (0-100) for one factor
pub fn quality_factor(metric: Metric, value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    match metric {
        Metric::Roe => stats::piecewise_linear(value, &ROE_CURVE),
        Metric::Roic => stats::piecewise_linear(value, &ROIC_CURVE),
        // negative leverage means negative equity, which the curve cannot rank
        Metric::DebtToEquity if value < 0.0 => None,
        Metric::DebtToEquity => stats::piecewise_linear(value, &DEBT_TO_EQUITY_CURVE),
        Metric::InterestCoverage => stats::piecewise_linear(value, &INTEREST_COVERAGE_CURVE),
        _ => None,
    }
}

impl RelativeValuationScorer {
    /// Valuation of a company against the median of its sector peers,
    /// capped at 100. Peers sharing the company's symbol are ignored.
    pub fn relative_valuation_score(&self, stock: &StockSnapshot, peers: &[StockSnapshot]) -> Option<f64> {
        let mut acc = FactorAccumulator::new();
        for factor in &PEER_VALUATION_FACTORS {
            let peer_values: Vec<f64> = peers
                .iter()
                .filter(|p| p.symbol != stock.symbol)
                .filter_map(|p| p.metrics.get(factor.metric))
                .filter(|v| *v > 0.0)
                .collect();
            let score = factor.score(stock.metrics.get(factor.metric), stats::median(&peer_values));
            if score.is_none() {
                debug!("{}: {} skipped in relative valuation", stock.symbol, factor.metric);
            }
            acc.add(score);
        }
        acc.average().map(|s| s.min(100.0))
    }

    /// Profitability and balance-sheet quality (0-100)
    pub fn quality_score(&self, metrics: &ValuationMetrics) -> Option<f64> {
        let mut acc = FactorAccumulator::new();
        for metric in [Metric::Roe, Metric::Roic, Metric::DebtToEquity, Metric::InterestCoverage] {
            acc.add(metrics.get(metric).and_then(|v| quality_factor(metric, v)));
        }
        acc.average()
    }
}
