//! Story input files
//!
//! Stories are read as a JSON array or as JSONL, one story per line. Each
//! record may carry a `simulation` block telling the headless host how its
//! media behaves.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use indras_stories::{MediaEvent, MediaHandle, MediaKind, Story, StoryId};

/// Default delay before simulated media reports back
pub const DEFAULT_LOAD_DELAY_MS: u64 = 50;

/// How a story's media behaves when the headless host loads it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedMedia {
    /// Intrinsic video length reported with the metadata
    pub duration_secs: Option<f64>,
    pub load_delay_ms: u64,
    /// Fail the load with this reason
    pub fail: Option<String>,
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self {
            duration_secs: None,
            load_delay_ms: DEFAULT_LOAD_DELAY_MS,
            fail: None,
        }
    }
}

impl SimulatedMedia {
    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    /// The event the host reports for this media, if any.
    ///
    /// Images only report failures. A video without a simulated duration
    /// never produces metadata, so it fails instead of stalling the session.
    pub fn outcome(&self, handle: MediaHandle, kind: MediaKind) -> Option<MediaEvent> {
        if let Some(reason) = &self.fail {
            return Some(MediaEvent::Failed {
                handle,
                reason: reason.clone(),
            });
        }
        match (kind, self.duration_secs) {
            (MediaKind::Image, _) => None,
            (MediaKind::Video, Some(duration_secs)) => Some(MediaEvent::MetadataReady {
                handle,
                duration_secs,
            }),
            (MediaKind::Video, None) => Some(MediaEvent::Failed {
                handle,
                reason: "no video metadata".to_string(),
            }),
        }
    }
}

/// One line of a story file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryRecord {
    #[serde(flatten)]
    pub story: Story,
    #[serde(default)]
    pub simulation: SimulatedMedia,
}

/// Parse story records from a JSON array or JSONL text
pub fn parse_records(text: &str) -> Result<Vec<StoryRecord>> {
    if text.trim_start().starts_with('[') {
        return serde_json::from_str(text).context("Invalid story array");
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line.trim())
                .with_context(|| format!("Invalid story record on line {}", i + 1))
        })
        .collect()
}

pub fn load_records(path: &Path) -> Result<Vec<StoryRecord>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read stories from {}", path.display()))?;
    parse_records(&text)
}

/// Split records into the story snapshot and the per-story media simulation
pub fn split_records(records: Vec<StoryRecord>) -> (Vec<Story>, HashMap<StoryId, SimulatedMedia>) {
    let mut stories = Vec::with_capacity(records.len());
    let mut media = HashMap::with_capacity(records.len());
    for record in records {
        media.insert(record.story.id.clone(), record.simulation);
        stories.push(record.story);
    }
    (stories, media)
}
