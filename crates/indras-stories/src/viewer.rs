//! Story viewer session
//!
//! Composes the bucket index, navigation, playback clock, media handling,
//! error recovery, and interaction layer into one session object. The host
//! feeds it input, media events, and frame tickets; the viewer calls back
//! into the host and the messenger.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::bucket;
use crate::clock::{Clock, FrameTicket, PlaybackClock, TickOutcome};
use crate::config::ViewerConfig;
use crate::error::ViewerResult;
use crate::interaction::{
    Action, Input, InteractionLayer, LikeAck, LikeSet, PauseReason, PauseReasons, ReplyField,
};
use crate::media::{self, DurationResolution, MediaEvent, MediaSlot};
use crate::messaging::{CloseReason, HostRoute, Messenger, ReplyRequest, ViewerHost};
use crate::navigation::{NavigationController, Step};
use crate::recovery::{ErrorRecovery, Recovery};
use crate::state::{PlaybackState, SlidePosition};
use crate::story::{AuthorId, MediaKind, Story, StoryId};

/// Result of redeeming a frame ticket
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Ticket was stale; nothing changed
    Stale,
    /// Slide progress after this frame
    Progress(f64),
    /// The slide finished and the viewer moved on
    Advanced(SlidePosition),
    /// The viewer is closed
    Closed,
}

/// What to draw in place of the slide's media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaView {
    /// Duration not yet known; show a loading state
    Loading,
    Ready,
    /// Media failed; show the "media unavailable" placeholder
    Unavailable,
}

/// Render model of the viewer at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewerSnapshot {
    pub story_id: StoryId,
    pub author_id: AuthorId,
    pub media_type: MediaKind,
    pub media_url: String,
    pub media: MediaView,
    pub position: SlidePosition,
    pub bucket_count: usize,
    pub slide_count: usize,
    pub progress: f64,
    /// Fill of each progress segment in the current bucket
    pub segments: Vec<f64>,
    pub paused: bool,
    pub liked: bool,
    pub like_ack_visible: bool,
    pub reply_draft: String,
    pub reply_focused: bool,
    /// Age of the story, e.g. "3h"
    pub posted_ago: String,
    pub closed: bool,
}

/// A story viewing session.
///
/// Single-threaded: every input, media event, and frame is handled on the
/// caller's thread, one at a time.
pub struct StoryViewer<C: Clock, M: Messenger, H: ViewerHost> {
    config: ViewerConfig,
    session_id: Uuid,
    span: tracing::Span,
    nav: NavigationController,
    clock: PlaybackClock<C>,
    media: MediaSlot,
    recovery: ErrorRecovery,
    interaction: InteractionLayer,
    pause: PauseReasons,
    likes: LikeSet,
    like_ack: LikeAck,
    reply: ReplyField,
    viewed: HashSet<StoryId>,
    messenger: M,
    host: H,
    closed: Option<CloseReason>,
}

impl<C: Clock, M: Messenger, H: ViewerHost> StoryViewer<C, M, H> {
    /// Open the viewer on a snapshot of `stories`.
    ///
    /// Starts at `start` if it names a story in the snapshot, otherwise at
    /// the first slide of the first bucket.
    pub fn open(
        stories: &[Story],
        start: Option<&StoryId>,
        config: ViewerConfig,
        clock: C,
        messenger: M,
        host: H,
    ) -> ViewerResult<Self> {
        config.validate()?;

        let buckets = bucket::build_buckets(stories);
        let slides = bucket::slide_count(&buckets);
        let nav = NavigationController::new(buckets, start, config.retreat_at_start)?;

        let session_id = Uuid::new_v4();
        let span = tracing::info_span!("story_viewer", session = %session_id);

        let mut viewer = Self {
            recovery: ErrorRecovery::new(config.fallback_duration_ms),
            interaction: InteractionLayer::new(config.previous_zone_fraction),
            config,
            session_id,
            span,
            nav,
            clock: PlaybackClock::new(clock),
            media: MediaSlot::new(),
            pause: PauseReasons::default(),
            likes: LikeSet::default(),
            like_ack: LikeAck::default(),
            reply: ReplyField::default(),
            viewed: HashSet::new(),
            messenger,
            host,
            closed: None,
        };

        let span = viewer.span.clone();
        let _enter = span.enter();
        info!(
            buckets = viewer.nav.bucket_count(),
            slides,
            start = ?start.map(StoryId::as_str),
            "Story viewer opened"
        );
        viewer.enter_current_slide();

        Ok(viewer)
    }

    /// Apply one user input
    pub fn handle(&mut self, input: Input) -> ViewerResult<()> {
        if self.is_closed() {
            return Ok(());
        }
        let span = self.span.clone();
        let _enter = span.enter();

        let action = self.interaction.translate(&input, self.reply.focused);
        trace!(?input, ?action, "Input");

        match action {
            Action::Advance => self.navigate(NavigationController::advance),
            Action::Retreat => self.navigate(NavigationController::retreat),
            Action::Close => self.finish(CloseReason::Dismissed),
            Action::Hold => self.add_pause(PauseReason::Hold),
            Action::Release => self.lift_pause(PauseReason::Hold),
            Action::TogglePause => {
                if self.pause.contains(PauseReason::Manual) {
                    self.lift_pause(PauseReason::Manual);
                } else {
                    self.add_pause(PauseReason::Manual);
                }
            }
            Action::ToggleLike => self.toggle_like(),
            Action::FocusReply => {
                self.reply.focused = true;
                self.add_pause(PauseReason::ReplyFocus);
                self.lift_pause(PauseReason::ReplyDraft);
            }
            Action::BlurReply => {
                self.reply.focused = false;
                if self.reply.has_draft() {
                    self.add_pause(PauseReason::ReplyDraft);
                }
                self.lift_pause(PauseReason::ReplyFocus);
            }
            Action::EditReply => {
                if let Input::ReplyChanged(text) = input {
                    self.reply.text = text;
                }
            }
            Action::SubmitReply => self.submit_reply()?,
            Action::Ignore => {}
        }

        Ok(())
    }

    /// Jump to a story by id; unknown ids are ignored
    pub fn jump_to(&mut self, id: &StoryId) {
        if self.is_closed() {
            return;
        }
        let span = self.span.clone();
        let _enter = span.enter();
        self.navigate(|nav| nav.jump_to(id));
    }

    /// Deliver a media readiness or failure signal from the host
    pub fn on_media_event(&mut self, event: MediaEvent) {
        if self.is_closed() {
            return;
        }
        let span = self.span.clone();
        let _enter = span.enter();

        if !self.media.is_current(event.handle()) {
            debug!(handle = %event.handle(), "Ignoring event for released media");
            return;
        }

        match event {
            MediaEvent::MetadataReady { duration_secs, .. } => {
                let state = self.nav.state();
                if state.media_error || state.resolved_duration_ms.is_some() {
                    debug!(duration_secs, "Ignoring metadata for resolved slide");
                    return;
                }
                match media::intrinsic_duration_ms(duration_secs) {
                    Some(ms) => {
                        debug!(duration_ms = ms, "Video metadata ready");
                        self.clock.start(self.nav.state_mut(), ms);
                    }
                    None => self.recover(&format!("unusable video duration {}", duration_secs)),
                }
            }
            MediaEvent::Failed { reason, .. } => self.recover(&reason),
        }
    }

    /// Issue the ticket for the next frame, if the clock is running and no
    /// ticket is outstanding
    pub fn schedule_frame(&mut self) -> Option<FrameTicket> {
        if self.is_closed() {
            return None;
        }
        self.clock.arm()
    }

    /// Redeem a frame ticket. Advances to the next slide when the current
    /// one completes.
    pub fn frame(&mut self, ticket: FrameTicket) -> FrameOutcome {
        if self.is_closed() {
            return FrameOutcome::Closed;
        }
        let span = self.span.clone();
        let _enter = span.enter();

        let now = self.clock.now();
        if self.like_ack.expire(now) {
            trace!("Like acknowledgment dismissed");
        }

        match self.clock.poll(ticket, self.nav.state_mut()) {
            TickOutcome::Stale => {
                debug!("Dropped stale frame");
                FrameOutcome::Stale
            }
            TickOutcome::Progress(progress) => FrameOutcome::Progress(progress),
            TickOutcome::Completed => {
                debug!(story = %self.nav.current_story().id, "Slide completed");
                self.navigate(NavigationController::advance);
                if self.is_closed() {
                    FrameOutcome::Closed
                } else {
                    FrameOutcome::Advanced(self.nav.position())
                }
            }
        }
    }

    /// Dismiss the viewer
    pub fn close(&mut self) {
        let span = self.span.clone();
        let _enter = span.enter();
        self.finish(CloseReason::Dismissed);
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        let story = self.nav.current_story();
        let state = self.nav.state();
        let bucket = self.nav.current_bucket();

        let media = if state.media_error {
            MediaView::Unavailable
        } else if state.is_loading() {
            MediaView::Loading
        } else {
            MediaView::Ready
        };

        let segments = (0..bucket.len())
            .map(|slide| match slide.cmp(&state.slide_index) {
                std::cmp::Ordering::Less => 1.0,
                std::cmp::Ordering::Equal => state.progress,
                std::cmp::Ordering::Greater => 0.0,
            })
            .collect();

        ViewerSnapshot {
            story_id: story.id.clone(),
            author_id: story.author_id.clone(),
            media_type: story.media_type,
            media_url: story.media_url.clone(),
            media,
            position: state.position(),
            bucket_count: self.nav.bucket_count(),
            slide_count: bucket.len(),
            progress: state.progress,
            segments,
            paused: state.paused,
            liked: self.likes.contains(&story.id),
            like_ack_visible: self.like_ack.is_visible(self.clock.now()),
            reply_draft: self.reply.text.clone(),
            reply_focused: self.reply.focused,
            posted_ago: format_age(story.posted_at, self.clock.clock().now_utc()),
            closed: self.closed.is_some(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        self.nav.state()
    }

    pub fn position(&self) -> SlidePosition {
        self.nav.position()
    }

    pub fn current_story(&self) -> &Story {
        self.nav.current_story()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.is_some()
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.closed
    }

    pub fn likes(&self) -> &LikeSet {
        &self.likes
    }

    /// Stories entered during this session
    pub fn viewed(&self) -> &HashSet<StoryId> {
        &self.viewed
    }

    pub fn reply_draft(&self) -> &str {
        &self.reply.text
    }

    /// Time left on the current slide, once its duration is known
    pub fn remaining(&self) -> Option<Duration> {
        self.clock.remaining(self.nav.state())
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn messenger(&self) -> &M {
        &self.messenger
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    fn navigate(&mut self, step: impl FnOnce(&mut NavigationController) -> Step) {
        match step(&mut self.nav) {
            Step::Moved(_) => {
                self.clock.cancel();
                self.enter_current_slide();
            }
            Step::Unchanged => trace!("Navigation had no effect"),
            Step::Exhausted => self.finish(CloseReason::Exhausted),
        }
    }

    /// Release the previous media handle, acquire one for the current slide,
    /// and start the clock if the duration is already known.
    fn enter_current_slide(&mut self) {
        if let Some(previous) = self.media.release() {
            self.host.release_media(previous);
        }
        let handle = self.media.acquire();

        let story = self.nav.current_story();
        let position = self.nav.position();
        let resolution = media::resolve_on_entry(story);
        self.viewed.insert(story.id.clone());

        info!(
            story = %story.id,
            author = %story.author_id,
            bucket = position.bucket,
            slide = position.slide,
            media_type = ?story.media_type,
            %handle,
            "Entered slide"
        );
        self.host.load_media(handle, story);

        match resolution {
            DurationResolution::Ready(ms) => self.clock.start(self.nav.state_mut(), ms),
            DurationResolution::Pending => debug!("Waiting for video metadata"),
        }
    }

    fn recover(&mut self, reason: &str) {
        let story = self.nav.current_story().id.clone();
        match self.recovery.recover(self.nav.state_mut()) {
            Recovery::Forced(ms) => {
                warn!(%story, reason, fallback_ms = ms, "Media failed; using fallback duration");
                self.clock.start(self.nav.state_mut(), ms);
            }
            Recovery::Capped(ms) => {
                warn!(
                    %story,
                    reason,
                    duration_ms = ms,
                    "Media failed after its duration resolved"
                );
            }
            Recovery::AlreadyHandled => {
                debug!(%story, reason, "Media failure already handled");
            }
        }
    }

    fn add_pause(&mut self, reason: PauseReason) {
        if self.pause.insert(reason) {
            self.clock.pause(self.nav.state_mut());
            debug!(?reason, elapsed_ms = self.nav.state().elapsed_ms, "Paused");
        }
    }

    fn lift_pause(&mut self, reason: PauseReason) {
        if self.pause.remove(reason) {
            self.clock.resume(self.nav.state_mut());
            debug!(?reason, elapsed_ms = self.nav.state().elapsed_ms, "Resumed");
        }
    }

    fn toggle_like(&mut self) {
        let id = self.nav.current_story().id.clone();
        let liked = self.likes.toggle(&id);
        if liked {
            self.like_ack.show(self.clock.now(), self.config.like_ack());
        }
        debug!(story = %id, liked, "Like toggled");
    }

    fn submit_reply(&mut self) -> ViewerResult<()> {
        if !self.reply.has_draft() {
            return Ok(());
        }

        let story = self.nav.current_story();
        let request = ReplyRequest::story_reply(story, self.reply.text.trim());
        let story_id = story.id.clone();
        let recipient = story.author_id.clone();

        if let Err(e) = self.messenger.send_reply(request) {
            warn!(story = %story_id, %recipient, error = %e, "Reply failed; keeping draft");
            return Err(e.into());
        }

        info!(story = %story_id, %recipient, "Reply sent");
        self.reply.clear();
        self.reply.focused = false;
        self.finish(CloseReason::ReplySent);
        self.host.navigate_to(HostRoute::Messages);
        Ok(())
    }

    /// Cancel the clock, release media, and tell the host. Runs once.
    fn finish(&mut self, reason: CloseReason) {
        if self.closed.is_some() {
            return;
        }
        self.clock.cancel();
        if let Some(handle) = self.media.release() {
            self.host.release_media(handle);
        }
        self.closed = Some(reason);
        info!(
            ?reason,
            viewed = self.viewed.len(),
            liked = self.likes.len(),
            "Story viewer closed"
        );
        self.host.close(reason);
    }
}

/// Format a story's age for display (e.g., "45s", "12m", "3h", "2d")
pub fn format_age(posted_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - posted_at).num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d", days)
    } else if hours > 0 {
        format!("{}h", hours)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", seconds)
    }
}
