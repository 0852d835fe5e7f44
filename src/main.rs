// =============================================================================
// stockchart-ta — command-line shell around the chart engine
// =============================================================================
//
// Usage: stockchart-ta <standard.json> <extended.json>
//
// Each file holds a JSON array of bars, oldest first:
//   [{ "date": "2024-02-01", "open": 1.0, "high": 1.2, "low": 0.9,
//      "close": 1.1, "volume": 1000 }, ...]
//
// The chart bundle is printed to stdout as JSON; logs go to stderr.
// =============================================================================

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stockchart_ta::{ChartEngine, EngineConfig, PriceBar};

fn main() -> Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [standard_path, extended_path] = args.as_slice() else {
        bail!("usage: stockchart-ta <standard.json> <extended.json>");
    };

    // ── 2. Config ────────────────────────────────────────────────────────
    let config_path =
        std::env::var("STOCKCHART_CONFIG").unwrap_or_else(|_| "engine_config.json".into());
    let config = EngineConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        EngineConfig::default()
    });

    // ── 3. Bars ──────────────────────────────────────────────────────────
    let standard = read_bars(Path::new(standard_path))?;
    let extended = read_bars(Path::new(extended_path))?;
    info!(
        standard = standard.len(),
        extended = extended.len(),
        "bars loaded"
    );

    // ── 4. Compute & emit ────────────────────────────────────────────────
    let engine = ChartEngine::new(config);
    let bundle = engine
        .compute_bundle(&standard, &extended)
        .context("bar input is malformed, see log for details")?;

    for d in &bundle.diagnostics {
        info!(series = %d.series, reason = %d.reason, "series not charted");
    }

    let json = serde_json::to_string_pretty(&bundle).context("failed to serialise chart bundle")?;
    println!("{json}");
    Ok(())
}

fn read_bars(path: &Path) -> Result<Vec<PriceBar>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bars from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse bars from {}", path.display()))
}
