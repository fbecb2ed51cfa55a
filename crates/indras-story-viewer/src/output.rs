//! JSONL session output
//!
//! The headless viewer renders by writing one JSON object per line: a
//! snapshot on every slide entry, on request, and a summary on close.

use std::io::Write;

use serde::Serialize;

use indras_stories::{CloseReason, ReplyRequest, StoryId, ViewerSnapshot};

/// Totals for a finished session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub reason: Option<CloseReason>,
    pub viewed: usize,
    pub liked: Vec<StoryId>,
    pub replies: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ViewerOutput<'a> {
    SlideEntered(&'a ViewerSnapshot),
    Snapshot(&'a ViewerSnapshot),
    ReplySent(&'a ReplyRequest),
    Closed(&'a SessionSummary),
}

impl ViewerOutput<'_> {
    /// Write as a single JSON line
    pub fn write_line<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        serde_json::to_writer(&mut *out, self)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}
