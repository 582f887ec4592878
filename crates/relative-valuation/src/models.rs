//! Records produced by the relative valuation scorer.

use analysis_core::Metric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a comparison is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonBasis {
    Peers,
    Sector,
    Market,
}

/// One metric of a company set against a reference value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub value: f64,
    /// Peer trimmed mean, sector trimmed mean or market value
    pub reference: f64,
    /// `value / reference * 100`
    pub relative_ratio: f64,
    /// Position of `value` among the reference group (0-100); not
    /// available for market comparisons
    pub percentile_rank: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativeComparison {
    pub symbol: String,
    pub basis: ComparisonBasis,
    pub metrics: BTreeMap<Metric, MetricComparison>,
}

/// Distribution of one metric across the members of a sector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorMetricSummary {
    pub trimmed_average: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorMetrics {
    pub sector: String,
    pub stock_count: usize,
    pub metrics: BTreeMap<Metric, SectorMetricSummary>,
    /// Cheapness of the sector against the market; `None` when no factor
    /// had both sector and market data
    pub relative_attractiveness: Option<f64>,
}

impl SectorMetrics {
    pub fn average(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).map(|m| m.trimmed_average)
    }
}

/// A company picked from an attractive sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativeValueOpportunity {
    pub symbol: String,
    pub sector: String,
    pub relative_valuation_score: f64,
    pub quality_score: f64,
    pub combined_score: f64,
    pub sector_attractiveness: f64,
}
