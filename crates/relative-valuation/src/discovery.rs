//! Sector-first relative-value screening.

use analysis_core::{StockSnapshot, ValuationMetrics};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::models::RelativeValueOpportunity;
use crate::RelativeValuationScorer;

impl RelativeValuationScorer {
    /// Find the best-valued quality companies inside attractive sectors.
    ///
    /// Sectors whose attractiveness against `market` is below `threshold`
    /// (the configured default when `None`) are dropped. Within each kept
    /// sector, companies are ranked by the blend of relative valuation and
    /// quality and the top few survive. The merged list is sorted by
    /// combined score, highest first; equal scores keep sector order.
    pub fn find_relative_value_opportunities(
        &self,
        stocks: &[StockSnapshot],
        market: &ValuationMetrics,
        threshold: Option<f64>,
    ) -> Vec<RelativeValueOpportunity> {
        let threshold = threshold.unwrap_or(self.config().attractiveness_threshold);

        let mut by_sector: BTreeMap<&str, Vec<StockSnapshot>> = BTreeMap::new();
        for stock in stocks {
            by_sector.entry(stock.sector.as_str()).or_default().push(stock.clone());
        }

        let mut opportunities = Vec::new();
        for (sector, members) in &by_sector {
            let metrics = self.sector_metrics(sector, members, market);
            let attractiveness = match metrics.relative_attractiveness {
                Some(a) if a >= threshold => a,
                other => {
                    debug!("Sector {} below threshold ({:?} < {})", sector, other, threshold);
                    continue;
                }
            };

            let mut picks: Vec<RelativeValueOpportunity> = members
                .iter()
                .filter_map(|stock| {
                    let valuation = self.relative_valuation_score(stock, members)?;
                    let quality = self.quality_score(&stock.metrics)?;
                    Some(RelativeValueOpportunity {
                        symbol: stock.symbol.clone(),
                        sector: stock.sector.clone(),
                        relative_valuation_score: valuation,
                        quality_score: quality,
                        combined_score: valuation * self.config().valuation_blend
                            + quality * self.config().quality_blend,
                        sector_attractiveness: attractiveness,
                    })
                })
                .collect();
            sort_by_combined(&mut picks);
            picks.truncate(self.config().top_per_sector);
            opportunities.extend(picks);
        }

        sort_by_combined(&mut opportunities);
        info!(
            "Relative value scan: {} sectors, {} opportunities",
            by_sector.len(),
            opportunities.len()
        );
        opportunities
    }
}

fn sort_by_combined(items: &mut [RelativeValueOpportunity]) {
    items.sort_by(|a, b| {
        b.combined_score
            .partial_cmp(&a.combined_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
