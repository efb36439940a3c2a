//! Replay tool for the highlight overlay reconciler
//!
//! Usage:
//!   highlight-overlay script.yaml
//!   highlight-overlay script.json --summary --policy replace

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use highlight_overlay::cli::{CliArgs, OutputMode};
use highlight_overlay::replay::{ReplayScript, ReplaySession};
use highlight_overlay::OverlayConfig;

fn main() -> Result<()> {
    highlight_overlay::tracing::init();

    let args = CliArgs::parse();
    let overlay = match &args.config {
        Some(path) => OverlayConfig::load_from(path).map_err(|e| anyhow!(e))?,
        None => OverlayConfig::load(),
    };
    let config = args.into_config(overlay).map_err(|e| anyhow!(e))?;

    let content = std::fs::read_to_string(&config.script)
        .with_context(|| format!("reading script {}", config.script.display()))?;
    let script = ReplayScript::parse(&content, &config.script)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("parsing script {}", config.script.display()))?;

    tracing::info!(
        steps = script.steps.len(),
        policy = ?config.overlay.update_policy,
        "replaying {}",
        config.script.display()
    );

    let session = ReplaySession::new(script.document, &config.overlay);
    for (index, step) in script.steps.iter().enumerate() {
        session
            .apply(step)
            .with_context(|| format!("step {} ({})", index + 1, step.name()))?;
    }

    match config.output {
        OutputMode::Html => println!("{}", session.to_html()),
        OutputMode::Summary => {
            let summary = serde_json::to_string_pretty(&session.summary())
                .context("serializing summary")?;
            println!("{}", summary);
        }
    }

    Ok(())
}
