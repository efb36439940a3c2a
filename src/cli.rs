//! Command-line argument parsing for the replay tool
//!
//! Supports:
//! - Replaying a JSON or YAML script
//! - Alternate config file
//! - Overriding the update policy and overlay colour
//! - JSON summary output instead of HTML

use clap::Parser;
use std::path::PathBuf;

use crate::config::{OverlayConfig, UpdatePolicy};

/// Replay highlight events against an in-memory page DOM
#[derive(Parser, Debug)]
#[command(
    name = "highlight-overlay",
    version,
    about = "Replay highlight events and print the resulting overlays"
)]
pub struct CliArgs {
    /// Script to replay (`.json`, otherwise YAML)
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Read overlay config from this file instead of the default location
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print a JSON summary instead of the page HTML
    #[arg(short = 's', long)]
    pub summary: bool,

    /// Update policy for repeated changes: duplicate or replace
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<String>,

    /// Overlay background colour
    #[arg(long, value_name = "COLOR")]
    pub fill_color: Option<String>,
}

/// What the replay prints when it finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Html,
    Summary,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub script: PathBuf,
    pub output: OutputMode,
    pub overlay: OverlayConfig,
}

fn parse_policy(name: &str) -> Result<UpdatePolicy, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "duplicate" => Ok(UpdatePolicy::Duplicate),
        "replace" => Ok(UpdatePolicy::Replace),
        other => Err(format!(
            "Unknown update policy '{}' (expected duplicate or replace)",
            other
        )),
    }
}

impl CliArgs {
    /// Apply CLI overrides on top of the loaded overlay config
    pub fn into_config(self, mut overlay: OverlayConfig) -> Result<ReplayConfig, String> {
        if let Some(policy) = &self.policy {
            overlay.update_policy = parse_policy(policy)?;
        }
        if let Some(color) = self.fill_color {
            overlay.fill_color = color;
        }

        let output = if self.summary {
            OutputMode::Summary
        } else {
            OutputMode::Html
        };

        Ok(ReplayConfig {
            script: self.script,
            output,
            overlay,
        })
    }
}
