//! Headless session loop
//!
//! Drives one [`StoryViewer`] on a fixed frame interval, feeding it control
//! events and simulated media events until it closes.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use indras_stories::{
    Clock, FrameOutcome, FrameTicket, Messenger, StoryId, StoryViewer, ViewerConfig,
};

use crate::events::{Control, ControlEvent};
use crate::host::HeadlessHost;
use crate::output::{SessionSummary, ViewerOutput};
use crate::records::{self, StoryRecord};

/// Everything a session needs besides its collaborators
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub records: Vec<StoryRecord>,
    pub start: Option<StoryId>,
    pub viewer: ViewerConfig,
}

type HeadlessViewer<C, M> = StoryViewer<C, M, HeadlessHost>;

/// Play the stories until the viewer closes.
///
/// Control events stop arriving when `commands` closes; playback carries on
/// without them until the last slide ends or the viewer is dismissed.
pub async fn run_session<C, M, W>(
    config: SessionConfig,
    clock: C,
    messenger: M,
    mut commands: mpsc::UnboundedReceiver<ControlEvent>,
    out: &mut W,
) -> Result<SessionSummary>
where
    C: Clock,
    M: Messenger,
    W: Write,
{
    let (media_tx, mut media_rx) = mpsc::unbounded_channel();
    let (stories, media) = records::split_records(config.records);
    let host = HeadlessHost::new(media, media_tx);

    let mut viewer = StoryViewer::open(
        &stories,
        config.start.as_ref(),
        config.viewer.clone(),
        clock,
        messenger,
        host,
    )
    .context("Failed to open story viewer")?;
    info!(session = %viewer.session_id(), stories = stories.len(), "Session started");

    let mut shown_loads = 0;
    emit_slide_if_entered(&viewer, &mut shown_loads, out)?;

    let mut frames = tokio::time::interval(config.viewer.frame_interval());
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticket: Option<FrameTicket> = None;
    let mut commands_open = true;

    while !viewer.is_closed() {
        tokio::select! {
            _ = frames.tick() => {
                if let Some(pending) = ticket.take() {
                    if let FrameOutcome::Stale = viewer.frame(pending) {
                        debug!("Frame ticket went stale");
                    }
                }
                ticket = viewer.schedule_frame();
            }
            Some(event) = media_rx.recv() => {
                viewer.on_media_event(event);
            }
            command = commands.recv(), if commands_open => match command {
                Some(event) => apply(&mut viewer, event, out)?,
                None => {
                    debug!("Control stream ended");
                    commands_open = false;
                }
            },
        }
        emit_slide_if_entered(&viewer, &mut shown_loads, out)?;
    }

    let mut liked: Vec<StoryId> = viewer.likes().iter().cloned().collect();
    liked.sort();
    let summary = SessionSummary {
        reason: viewer.close_reason(),
        viewed: viewer.viewed().len(),
        liked,
        replies: viewer.host().routes().len(),
    };
    ViewerOutput::Closed(&summary).write_line(out)?;
    info!(reason = ?summary.reason, viewed = summary.viewed, "Session finished");

    Ok(summary)
}

fn apply<C: Clock, M: Messenger, W: Write>(
    viewer: &mut HeadlessViewer<C, M>,
    event: ControlEvent,
    out: &mut W,
) -> Result<()> {
    match event.into_control() {
        Control::Input(input) => {
            // A failed reply leaves the viewer open with the draft intact
            if let Err(e) = viewer.handle(input) {
                warn!(error = %e, "Input not applied");
            }
        }
        Control::Jump(id) => viewer.jump_to(&id),
        Control::Snapshot => ViewerOutput::Snapshot(&viewer.snapshot()).write_line(out)?,
        Control::Ignore => {}
    }
    Ok(())
}

/// Emit a snapshot when the viewer has entered a slide since the last one
fn emit_slide_if_entered<C: Clock, M: Messenger, W: Write>(
    viewer: &HeadlessViewer<C, M>,
    shown_loads: &mut u64,
    out: &mut W,
) -> Result<()> {
    let loads = viewer.host().loads_started();
    if loads != *shown_loads && !viewer.is_closed() {
        *shown_loads = loads;
        ViewerOutput::SlideEntered(&viewer.snapshot()).write_line(out)?;
    }
    Ok(())
}
