use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use indras_stories::{RetreatAtStart, ViewerConfig};

#[derive(Parser, Debug)]
#[command(name = "story-viewer")]
#[command(about = "Play Indras stories headlessly, driven by JSONL control events")]
pub struct Args {
    /// Story file (JSON array or JSONL)
    pub stories: PathBuf,

    /// Open at this story id instead of the first slide
    #[arg(long)]
    pub start: Option<String>,

    /// Read control events from file instead of stdin
    #[arg(short, long)]
    pub commands: Option<PathBuf>,

    /// Viewer configuration (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the fallback duration for failed media
    #[arg(long)]
    pub fallback_ms: Option<u64>,

    /// Retreating from the first slide: "stay" or "close"
    #[arg(long, value_parser = parse_retreat)]
    pub retreat_at_start: Option<RetreatAtStart>,

    /// Append replies to this file instead of stdout
    #[arg(long)]
    pub outbox: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Human-readable logs instead of JSONL
    #[arg(long)]
    pub pretty: bool,

    /// Also write JSONL logs to this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

fn parse_retreat(value: &str) -> Result<RetreatAtStart, String> {
    match value {
        "stay" => Ok(RetreatAtStart::Stay),
        "close" => Ok(RetreatAtStart::Close),
        other => Err(format!("expected \"stay\" or \"close\", got {:?}", other)),
    }
}

impl Args {
    /// Load the config file, if any, then apply command-line overrides
    pub fn viewer_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ViewerConfig::default(),
        };
        if let Some(ms) = self.fallback_ms {
            config.fallback_duration_ms = ms;
        }
        if let Some(policy) = self.retreat_at_start {
            config.retreat_at_start = policy;
        }
        config.validate()?;
        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<ViewerConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}
