//! Comparisons of a company against its history, peers, sector and market.

use analysis_core::{stats, FinancialPeriod, Metric, StockSnapshot, ValuationMetrics};
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{
    ComparisonBasis, MetricComparison, RelativeComparison, SectorMetricSummary, SectorMetrics,
};
use crate::scoring::{FactorAccumulator, SECTOR_ATTRACTIVENESS_FACTORS};
use crate::RelativeValuationScorer;

/// Positive values sorted ascending
fn sorted_positive(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.into_iter().filter(|v| *v > 0.0 && v.is_finite()).collect();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out
}

impl RelativeValuationScorer {
    /// Percentile (0-100) of `current` among the positive historical values
    /// of `metric`. `None` when the history has no positive value.
    pub fn historical_percentile(&self, history: &[FinancialPeriod], metric: Metric, current: f64) -> Option<f64> {
        let sorted = sorted_positive(history.iter().filter_map(|p| p.value(metric)));
        stats::percentile_in_sorted(&sorted, current)
    }

    /// Each ratio metric of `stock` against the trimmed mean of its peers.
    /// Metrics where the company or every peer lacks a positive value are
    /// left out.
    pub fn compare_to_peers(&self, stock: &StockSnapshot, peers: &[StockSnapshot]) -> RelativeComparison {
        let mut metrics = BTreeMap::new();
        for metric in Metric::VALUATION {
            let Some(value) = stock.metrics.get(metric).filter(|v| *v > 0.0) else {
                continue;
            };
            let sorted = sorted_positive(
                peers
                    .iter()
                    .filter(|p| p.symbol != stock.symbol)
                    .filter_map(|p| p.metrics.get(metric)),
            );
            let Some(average) = stats::trimmed_mean(&sorted, self.config().trim_fraction) else {
                debug!("{}: no peer data for {}", stock.symbol, metric);
                continue;
            };
            metrics.insert(
                metric,
                MetricComparison {
                    value,
                    reference: average,
                    relative_ratio: value / average * 100.0,
                    percentile_rank: stats::percentile_in_sorted(&sorted, value),
                },
            );
        }
        RelativeComparison {
            symbol: stock.symbol.clone(),
            basis: ComparisonBasis::Peers,
            metrics,
        }
    }

    /// Plain ratio of each metric to the market-wide value, without trimming
    pub fn compare_to_market(&self, stock: &StockSnapshot, market: &ValuationMetrics) -> RelativeComparison {
        let metrics = Metric::VALUATION
            .iter()
            .filter_map(|&metric| {
                let value = stock.metrics.get(metric)?;
                let reference = market.get(metric).filter(|r| *r > 0.0)?;
                Some((
                    metric,
                    MetricComparison {
                        value,
                        reference,
                        relative_ratio: value / reference * 100.0,
                        percentile_rank: None,
                    },
                ))
            })
            .collect();
        RelativeComparison {
            symbol: stock.symbol.clone(),
            basis: ComparisonBasis::Market,
            metrics,
        }
    }

    /// Distribution of every ratio metric across the members of `sector`
    /// plus the sector's attractiveness against the market.
    ///
    /// The per-metric summaries trim `floor(n * fraction)` from each end;
    /// the attractiveness inputs trim at least one.
    pub fn sector_metrics(&self, sector: &str, stocks: &[StockSnapshot], market: &ValuationMetrics) -> SectorMetrics {
        let members: Vec<&StockSnapshot> = stocks.iter().filter(|s| s.sector == sector).collect();

        let mut metrics = BTreeMap::new();
        let mut attractiveness_inputs = BTreeMap::new();
        for metric in Metric::VALUATION {
            let sorted = sorted_positive(members.iter().filter_map(|s| s.metrics.get(metric)));
            // attractiveness always drops the extremes, even in small sectors
            if let Some(avg) = stats::trimmed_mean_with_min(&sorted, self.config().trim_fraction, 1) {
                attractiveness_inputs.insert(metric, avg);
            }
            let summary = stats::trimmed_mean(&sorted, self.config().trim_fraction).and_then(|avg| {
                Some(SectorMetricSummary {
                    trimmed_average: avg,
                    median: stats::median(&sorted)?,
                    min: *sorted.first()?,
                    max: *sorted.last()?,
                    count: sorted.len(),
                })
            });
            if let Some(summary) = summary {
                metrics.insert(metric, summary);
            }
        }

        let mut acc = FactorAccumulator::new();
        for factor in &SECTOR_ATTRACTIVENESS_FACTORS {
            let sector_value = attractiveness_inputs.get(&factor.metric).copied();
            acc.add(factor.score(sector_value, market.get(factor.metric)));
        }

        SectorMetrics {
            sector: sector.to_string(),
            stock_count: members.len(),
            metrics,
            relative_attractiveness: acc.average(),
        }
    }

    /// Each ratio metric of `stock` against its sector's trimmed averages
    pub fn compare_to_sector(&self, stock: &StockSnapshot, sector: &SectorMetrics) -> RelativeComparison {
        let metrics = sector
            .metrics
            .iter()
            .filter_map(|(&metric, summary)| {
                let value = stock.metrics.get(metric).filter(|v| *v > 0.0)?;
                if summary.trimmed_average <= 0.0 {
                    return None;
                }
                // position between the sector extremes
                let percentile_rank = if summary.max > summary.min {
                    Some(((value - summary.min) / (summary.max - summary.min) * 100.0).clamp(0.0, 100.0))
                } else {
                    None
                };
                Some((
                    metric,
                    MetricComparison {
                        value,
                        reference: summary.trimmed_average,
                        relative_ratio: value / summary.trimmed_average * 100.0,
                        percentile_rank,
                    },
                ))
            })
            .collect();
        RelativeComparison {
            symbol: stock.symbol.clone(),
            basis: ComparisonBasis::Sector,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn stock(symbol: &str, sector: &str, pe: f64) -> StockSnapshot {
        StockSnapshot {
            symbol: symbol.to_string(),
            sector: sector.to_string(),
            metrics: ValuationMetrics {
                pe: Some(pe),
                ..ValuationMetrics::default()
            },
        }
    }

    fn market() -> ValuationMetrics {
        ValuationMetrics {
            pe: Some(20.0),
            pb: Some(4.0),
            dividend_yield: Some(2.0),
            free_cash_flow_yield: Some(4.0),
            ..ValuationMetrics::default()
        }
    }

    #[test]
    fn test_historical_percentile() {
        let scorer = RelativeValuationScorer::new();
        let history: Vec<FinancialPeriod> = [40.0, -3.0, 20.0, 10.0, 30.0]
            .iter()
            .enumerate()
            .map(|(i, &pe)| {
                let mut p = FinancialPeriod::new(NaiveDate::from_ymd_opt(2020 + i as i32, 12, 31).unwrap());
                p.ratios.pe = Some(pe);
                p
            })
            .collect();

        assert_eq!(scorer.historical_percentile(&history, Metric::Pe, 25.0), Some(50.0));
        assert_eq!(scorer.historical_percentile(&history, Metric::Pe, 5.0), Some(0.0));
        assert_eq!(scorer.historical_percentile(&history, Metric::Pe, 50.0), Some(100.0));
        assert_eq!(scorer.historical_percentile(&history, Metric::Pb, 1.0), None);
    }

    #[test]
    fn test_peer_comparison_trims_outliers_at_ten_peers() {
        let scorer = RelativeValuationScorer::new();
        let target = stock("AAA", "Energy", 13.5);
        let peers: Vec<StockSnapshot> = [1.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 500.0]
            .iter()
            .enumerate()
            .map(|(i, &pe)| stock(&format!("P{}", i), "Energy", pe))
            .collect();

        let comparison = scorer.compare_to_peers(&target, &peers);
        let pe = comparison.metrics[&Metric::Pe];

        assert_eq!(comparison.basis, ComparisonBasis::Peers);
        assert_relative_eq!(pe.reference, 13.5);
        assert_relative_eq!(pe.relative_ratio, 100.0);
        // 13.5 first reached at sorted index 5 of the untrimmed 10
        assert_relative_eq!(pe.percentile_rank.unwrap(), 50.0);
    }

    #[test]
    fn test_peer_comparison_keeps_outlier_below_ten_peers() {
        let scorer = RelativeValuationScorer::new();
        let target = stock("AAA", "Energy", 15.0);
        let peers: Vec<StockSnapshot> = [5.0, 10.0, 15.0, 20.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, &pe)| stock(&format!("P{}", i), "Energy", pe))
            .collect();

        let pe = scorer.compare_to_peers(&target, &peers).metrics[&Metric::Pe];

        assert_relative_eq!(pe.reference, 30.0);
        assert_relative_eq!(pe.relative_ratio, 50.0);
    }

    #[test]
    fn test_peer_comparison_skips_missing_metrics() {
        let scorer = RelativeValuationScorer::new();
        let target = stock("AAA", "Energy", 12.0);
        let peers = vec![stock("BBB", "Energy", -8.0)];

        let comparison = scorer.compare_to_peers(&target, &peers);
        assert!(comparison.metrics.is_empty());
    }

    #[test]
    fn test_market_comparison_is_untrimmed_ratio() {
        let scorer = RelativeValuationScorer::new();
        let mut target = stock("AAA", "Energy", 30.0);
        target.metrics.dividend_yield = Some(3.0);
        target.metrics.roe = Some(12.0);

        let comparison = scorer.compare_to_market(&target, &market());

        assert_eq!(comparison.metrics.len(), 2);
        assert_relative_eq!(comparison.metrics[&Metric::Pe].relative_ratio, 150.0);
        assert_relative_eq!(comparison.metrics[&Metric::DividendYield].relative_ratio, 150.0);
        assert!(comparison.metrics[&Metric::Pe].percentile_rank.is_none());
    }

    #[test]
    fn test_sector_metrics_trim_boundary() {
        let scorer = RelativeValuationScorer::new();
        let five: Vec<StockSnapshot> = [5.0, 10.0, 15.0, 20.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, &pe)| stock(&format!("F{}", i), "Tech", pe))
            .collect();

        let metrics = scorer.sector_metrics("Tech", &five, &market());
        let pe = metrics.metrics[&Metric::Pe];
        assert_relative_eq!(pe.trimmed_average, 30.0);
        assert_relative_eq!(pe.median, 15.0);
        assert_relative_eq!(pe.min, 5.0);
        assert_relative_eq!(pe.max, 100.0);
        assert_eq!(pe.count, 5);

        let ten: Vec<StockSnapshot> = [1.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 500.0]
            .iter()
            .enumerate()
            .map(|(i, &pe)| stock(&format!("T{}", i), "Tech", pe))
            .collect();
        let metrics = scorer.sector_metrics("Tech", &ten, &market());
        assert_relative_eq!(metrics.metrics[&Metric::Pe].trimmed_average, 13.5);
    }

    #[test]
    fn test_sector_attractiveness() {
        let scorer = RelativeValuationScorer::new();
        let members: Vec<StockSnapshot> = (0..3)
            .map(|i| StockSnapshot {
                symbol: format!("U{}", i),
                sector: "Utilities".to_string(),
                metrics: ValuationMetrics {
                    pe: Some(10.0),
                    pb: Some(2.0),
                    dividend_yield: Some(4.0),
                    free_cash_flow_yield: None,
                    ..ValuationMetrics::default()
                },
            })
            .chain(std::iter::once(stock("OTHER", "Energy", 99.0)))
            .collect();

        let metrics = scorer.sector_metrics("Utilities", &members, &market());

        assert_eq!(metrics.stock_count, 3);
        // PE 50, PB 50, DY 50; FCF yield has no sector data and is skipped
        assert_relative_eq!(metrics.relative_attractiveness.unwrap(), 50.0);

        let empty = scorer.sector_metrics("Utilities", &members, &ValuationMetrics::default());
        assert_eq!(empty.relative_attractiveness, None);
    }

    #[test]
    fn test_sector_attractiveness_trims_at_least_one_per_side() {
        let scorer = RelativeValuationScorer::new();
        let five: Vec<StockSnapshot> = [5.0, 10.0, 15.0, 20.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, &pe)| stock(&format!("F{}", i), "Tech", pe))
            .collect();
        let market = ValuationMetrics {
            pe: Some(20.0),
            ..ValuationMetrics::default()
        };

        let metrics = scorer.sector_metrics("Tech", &five, &market);

        // summary keeps the floor rule, attractiveness uses PE 15 from [10, 15, 20]
        assert_relative_eq!(metrics.metrics[&Metric::Pe].trimmed_average, 30.0);
        assert_relative_eq!(metrics.relative_attractiveness.unwrap(), 100.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sector_comparison() {
        let scorer = RelativeValuationScorer::new();
        let members: Vec<StockSnapshot> = [10.0, 20.0, 30.0]
            .iter()
            .enumerate()
            .map(|(i, &pe)| stock(&format!("M{}", i), "Materials", pe))
            .collect();
        let sector = scorer.sector_metrics("Materials", &members, &market());

        let comparison = scorer.compare_to_sector(&stock("NEW", "Materials", 25.0), &sector);
        let pe = comparison.metrics[&Metric::Pe];

        assert_eq!(comparison.basis, ComparisonBasis::Sector);
        assert_relative_eq!(pe.relative_ratio, 125.0);
        assert_relative_eq!(pe.percentile_rank.unwrap(), 75.0);
    }
}
