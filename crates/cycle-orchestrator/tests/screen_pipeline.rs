use analysis_core::{
    CyclePhase, CyclicalityCategory, EconomicIndicatorPoint, EngineConfig, FinancialPeriod,
    MarketCyclePhase, ValuationMetrics,
};
use approx::assert_relative_eq;
use chrono::NaiveDate;
use cycle_orchestrator::{CycleScreener, ScreenRequest, StockInput};
use cycle_strategy::AssetAllocation;
use std::collections::BTreeMap;

/// Quarter ends, most recent first
fn quarter_ends() -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for year in [2024, 2023] {
        for (month, day) in [(12, 31), (9, 30), (6, 30), (3, 31)] {
            dates.push(NaiveDate::from_ymd_opt(year, month, day).unwrap());
        }
    }
    dates
}

fn history(earnings: [f64; 8], revenue: [f64; 8], margins: [f64; 8], pe: [f64; 8]) -> Vec<FinancialPeriod> {
    quarter_ends()
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let mut period = FinancialPeriod::new(date);
            period.earnings = Some(earnings[i]);
            period.revenue = Some(revenue[i]);
            period.margins = Some(margins[i]);
            period.ratios.pe = Some(pe[i]);
            period
        })
        .collect()
}

fn with_current_ratios(mut history: Vec<FinancialPeriod>, pb: f64, dividend_yield: f64) -> Vec<FinancialPeriod> {
    let current = &mut history[0].ratios;
    current.pb = Some(pb);
    current.dividend_yield = Some(dividend_yield);
    current.roe = Some(15.0);
    history
}

fn request(phase: &str, overvalued: bool) -> ScreenRequest {
    let steel = with_current_ratios(
        history(
            [6.0, 7.0, 2.0, 8.0, 1.5, 9.0, 3.0, 6.5],
            [70.0, 75.0, 45.0, 85.0, 40.0, 90.0, 50.0, 72.0],
            [9.0, 10.0, 4.0, 12.0, 3.0, 13.0, 5.0, 9.5],
            [18.0, 16.0, 30.0, 14.0, 35.0, 12.0, 25.0, 17.0],
        ),
        3.0,
        1.0,
    );
    let copper = with_current_ratios(
        history(
            [2.0, 8.0, 1.0, 9.0, 3.0, 10.0, 0.5, 7.0],
            [50.0, 80.0, 40.0, 90.0, 55.0, 95.0, 35.0, 85.0],
            [5.0, 12.0, 3.0, 13.0, 6.0, 14.0, 2.0, 11.0],
            [12.0, 20.0, 15.0, 25.0, 10.0, 30.0, 18.0, 22.0],
        ),
        2.0,
        2.0,
    );
    let beverages = with_current_ratios(
        history(
            [10.5, 10.3, 10.4, 10.2, 10.3, 10.1, 10.2, 10.0],
            [101.0, 100.5, 100.8, 100.2, 100.4, 100.0, 100.1, 99.8],
            [21.0, 20.5, 21.0, 20.5, 20.8, 20.4, 20.6, 20.2],
            [24.0, 23.0, 24.5, 22.0, 23.5, 22.5, 24.0, 23.0],
        ),
        8.0,
        3.0,
    );

    let gdp: Vec<EconomicIndicatorPoint> = quarter_ends()
        .into_iter()
        .zip([104.0, 103.5, 102.0, 102.5, 101.0, 101.8, 100.5, 100.0])
        .map(|(date, value)| EconomicIndicatorPoint { date, value })
        .collect();

    ScreenRequest {
        market_phase: phase.to_string(),
        market_overvalued: overvalued,
        market: ValuationMetrics {
            pe: Some(20.0),
            pb: Some(4.0),
            dividend_yield: Some(2.0),
            ..ValuationMetrics::default()
        },
        economic_indicators: BTreeMap::from([("gdp".to_string(), gdp)]),
        stocks: vec![
            StockInput {
                symbol: "NUE".to_string(),
                sector: "Materials".to_string(),
                history: steel,
            },
            StockInput {
                symbol: "FCX".to_string(),
                sector: "Materials".to_string(),
                history: copper,
            },
            StockInput {
                symbol: "KO".to_string(),
                sector: "Consumer Staples".to_string(),
                history: beverages,
            },
        ],
        config: None,
    }
}

#[test]
fn test_report_keeps_request_order_and_covers_every_stock() {
    let report = CycleScreener::default().screen(&request("Mid Expansion", false)).unwrap();

    let symbols: Vec<&str> = report.stocks.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["NUE", "FCX", "KO"]);
    assert_eq!(report.ranking.opportunities.len(), 3);
    assert_eq!(report.market_phase, Some(MarketCyclePhase::MidExpansion));

    let sectors: Vec<&str> = report.sectors.iter().map(|s| s.sector.as_str()).collect();
    assert_eq!(sectors, vec!["Consumer Staples", "Materials"]);
    assert_eq!(report.sectors[1].stock_count, 2);
}

#[test]
fn test_cyclicality_separates_commodity_from_staples() {
    let report = CycleScreener::default().screen(&request("Mid Expansion", false)).unwrap();

    let copper = report.stock("FCX").unwrap();
    assert_eq!(copper.cyclicality.cyclicality_category, CyclicalityCategory::HighlyCyclical);
    assert_ne!(copper.cyclicality.current_phase, CyclePhase::Indeterminate);

    let staples = report.stock("KO").unwrap();
    assert_eq!(staples.cyclicality.cyclicality_category, CyclicalityCategory::Defensive);
    assert!(staples.cyclicality.error.is_none());
}

#[test]
fn test_per_stock_valuation_outputs() {
    let report = CycleScreener::default().screen(&request("Mid Expansion", false)).unwrap();
    let copper = report.stock("FCX").unwrap();

    // current PE 12 in history [10, 12, 15, 18, 20, 22, 25, 30]
    assert_relative_eq!(copper.historical_pe_percentile.unwrap(), 12.5);
    assert_relative_eq!(copper.quality_score.unwrap(), 75.0);
    // one Materials peer, so the peer median is that peer's value
    assert!(copper.relative_valuation_score.is_some());
    assert!(copper.sector_comparison.is_some());

    let gdp = &copper.sensitivity.results["gdp"];
    assert_eq!(gdp.matched_points, 8);
    assert!(gdp.beta.is_some());
    assert_eq!(copper.sensitivity.most_sensitive.as_deref(), Some("gdp"));

    // alone in its sector: no peers to score against
    let staples = report.stock("KO").unwrap();
    assert_eq!(staples.relative_valuation_score, None);
    assert!(staples.peer_comparison.metrics.is_empty());
}

#[test]
fn test_early_expansion_favours_highly_cyclical() {
    let report = CycleScreener::default().screen(&request("Early Expansion", true)).unwrap();

    let position = |symbol: &str| {
        report
            .ranking
            .opportunities
            .iter()
            .position(|o| o.candidate.symbol == symbol)
            .unwrap()
    };
    assert!(position("FCX") < position("KO"));

    let copper = &report.ranking.opportunities[position("FCX")];
    assert_eq!(copper.cyclical_fit, 100.0);

    assert_eq!(
        report.recommendation.allocation,
        AssetAllocation {
            equities: 60.0,
            bonds: 25.0,
            cash: 10.0,
            alternatives: 5.0,
        }
    );
}

#[test]
fn test_unknown_phase_uses_fallback_guidance() {
    let report = CycleScreener::default().screen(&request("Stagflation", false)).unwrap();

    assert_eq!(report.market_phase, None);
    assert_eq!(report.ranking.phase, None);
    assert_eq!(report.recommendation.phase, MarketCyclePhase::LateExpansion);
}

#[test]
fn test_relative_value_picks_respect_threshold() {
    let report = CycleScreener::default().screen(&request("Mid Expansion", false)).unwrap();

    // Materials sits near 31 and Consumer Staples near 24, both under 70
    assert!(report.relative_value_opportunities.is_empty());
    for sector in &report.sectors {
        assert!(sector.relative_attractiveness.unwrap() < 70.0);
    }
}

#[test]
fn test_relative_value_picks_with_lower_threshold() {
    let mut req = request("Mid Expansion", false);
    req.config = Some(EngineConfig {
        attractiveness_threshold: 20.0,
        top_per_sector: 1,
        ..EngineConfig::default()
    });

    let report = CycleScreener::default().screen(&req).unwrap();
    let picks = &report.relative_value_opportunities;

    // KO has no sector peers and so no valuation score; Materials keeps one of two
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].sector, "Materials");
    assert!(picks[0].sector_attractiveness >= 20.0);
    for pick in picks {
        assert_relative_eq!(
            pick.combined_score,
            0.6 * pick.relative_valuation_score + 0.4 * pick.quality_score,
            epsilon = 1e-9
        );
    }

    // the kept pick is the better of the two Materials candidates
    let best = ["FCX", "NUE"]
        .iter()
        .map(|s| {
            let stock = report.stock(s).unwrap();
            0.6 * stock.relative_valuation_score.unwrap() + 0.4 * stock.quality_score.unwrap()
        })
        .fold(f64::NEG_INFINITY, f64::max);
    assert_relative_eq!(picks[0].combined_score, best, epsilon = 1e-9);
}

#[test]
fn test_relative_value_picks_sorted_and_capped() {
    let mut req = request("Mid Expansion", false);
    req.config = Some(EngineConfig {
        attractiveness_threshold: 20.0,
        ..EngineConfig::default()
    });

    let report = CycleScreener::default().screen(&req).unwrap();
    let picks = &report.relative_value_opportunities;

    assert_eq!(picks.len(), 2);
    assert!(picks.iter().filter(|p| p.sector == "Materials").count() <= 3);
    for pair in picks.windows(2) {
        assert!(pair[0].combined_score >= pair[1].combined_score);
    }
}

#[test]
fn test_json_request_round_trip() {
    let raw = r#"{
        "marketPhase": "Late Contraction",
        "marketOvervalued": true,
        "market": { "pe": 18.0, "pb": 3.0 },
        "stocks": [
            {
                "symbol": "JPM",
                "sector": "Financials",
                "history": [
                    { "date": "2024-12-31", "earnings": 4.8, "revenue": 40.0, "margins": 30.0, "pe": 12.0, "roe": 16.0 },
                    { "date": "2024-09-30", "earnings": 4.2, "revenue": 39.0, "margins": 28.0, "pe": 11.0 }
                ]
            }
        ],
        "config": { "minPeriods": 2 }
    }"#;

    let request: ScreenRequest = serde_json::from_str(raw).unwrap();
    assert!(request.economic_indicators.is_empty());

    let report = CycleScreener::default().screen(&request).unwrap();
    let bank = report.stock("JPM").unwrap();
    assert!(bank.cyclicality.cyclicality_score.is_some());
    // trend windows need eight quarters
    assert_eq!(bank.cyclicality.current_phase, CyclePhase::Indeterminate);
    assert_eq!(report.recommendation.allocation.equities, 45.0);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json.get("generatedAt").is_some());
    assert_eq!(json["stocks"][0]["symbol"], "JPM");
    // one casing across nested records
    assert!(json["stocks"][0]["cyclicality"].get("cyclicalityScore").is_some());
    assert!(json["stocks"][0]["cyclicality"].get("cyclicality_score").is_none());
    assert!(json["recommendation"].get("baseAllocation").is_some());
    assert!(json["ranking"]["strategy"].get("valueWeight").is_some());
    assert!(json["ranking"]["opportunities"][0].get("cyclicalFit").is_some());
}
