//! cycle-screener: run the cycle-aware valuation screen over a JSON request.
//!
//! Usage:
//!   cargo run -p cycle-orchestrator --bin cycle-screener -- request.json
//!   cargo run -p cycle-orchestrator --bin cycle-screener -- request.json --pretty
//!
//! Engine settings come from `CYCLE_*` environment variables (a `.env` file
//! is honoured) unless the request embeds its own `config`.

use analysis_core::EngineConfig;
use anyhow::Context;
use cycle_orchestrator::{CycleScreener, ScreenRequest};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cycle_screener=info,cycle_orchestrator=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let pretty = args.iter().any(|a| a == "--pretty");
    let path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .context("usage: cycle-screener <request.json> [--pretty]")?;

    let config = EngineConfig::from_env().context("invalid CYCLE_* environment configuration")?;

    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?;
    let request: ScreenRequest =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse screen request {}", path))?;

    tracing::info!("Loaded {} stocks from {}", request.stocks.len(), path);

    let report = CycleScreener::new(config)
        .screen(&request)
        .context("screen request rejected")?;

    let output = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}
