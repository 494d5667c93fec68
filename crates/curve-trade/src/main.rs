use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use curve_trade::config;
use curve_trade::logging;
use curve_trade::replay::{load_scenario, Session};

fn main() -> Result<()> {
    // Load .env file (ignore if missing).
    let _ = dotenvy::dotenv();

    // Config directory, default `./config`.
    let config_dir = std::env::var("TRADE_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));

    // Load and validate configuration.
    let config = config::load_config(&config_dir)?;

    // Initialize tracing; hold the guard for the process lifetime.
    let _guard = logging::init_tracing(&config.app.logging)?;

    info!(
        base_decimals = config.trading.base_decimals,
        token_decimals = config.trading.token_decimals,
        max_input_decimals = ?config.trading.max_input_decimals,
        thousands_separator = config.trading.thousands_separator,
        "trade replay starting"
    );

    // Scenario path: first CLI argument, then TRADE_SCENARIO.
    let scenario_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TRADE_SCENARIO").ok())
        .map(PathBuf::from)
        .context("usage: trade-replay <scenario.json> (or set TRADE_SCENARIO)")?;

    let scenario = load_scenario(&scenario_path)
        .with_context(|| format!("failed to load scenario: {}", scenario_path.display()))?;

    let mut session = Session::new(&config.trading);
    let summary = session
        .run(&scenario)
        .with_context(|| format!("scenario {:?} failed", scenario.name))?;

    for step in &summary.steps {
        if step.rejected {
            warn!(step = step.step, display = %step.display, "keystroke rejected");
        }
        info!(
            step = step.step,
            event = step.event,
            elapsed_ms = step.elapsed_ms,
            display = %step.display,
            amount = %step.intent.amount,
            mode = step.intent.mode.as_str(),
            direction = step.intent.direction.as_str(),
            button = %step.button.text,
            disabled = step.button.disabled,
            "step applied"
        );
    }

    info!(
        scenario = %summary.scenario,
        quote_requests = summary.quote_requests,
        button = %summary.final_button.text,
        "replay finished"
    );

    let json = serde_json::to_string_pretty(&summary).context("serializing replay summary")?;
    println!("{json}");

    Ok(())
}
