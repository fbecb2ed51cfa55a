//! In-memory collaborators for testing
//!
//! A manually advanced clock plus recording implementations of the
//! messaging and host traits, so viewer logic can be exercised without a
//! UI or a messaging stack.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use indras_stories::mock::{ManualClock, RecordingHost, RecordingMessenger};
//!
//! let clock = ManualClock::new();
//! let mut viewer = StoryViewer::open(
//!     &stories,
//!     None,
//!     ViewerConfig::default(),
//!     clock.clone(),
//!     RecordingMessenger::new(),
//!     RecordingHost::new(),
//! )?;
//!
//! clock.advance_ms(5_000);
//! let ticket = viewer.schedule_frame().unwrap();
//! viewer.frame(ticket);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::error::MessagingError;
use crate::media::MediaHandle;
use crate::messaging::{CloseReason, HostRoute, Messenger, ReplyRequest, ViewerHost};
use crate::story::{Story, StoryId};

/// Clock that only moves when told to.
///
/// Clones share the same timeline.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    base_utc: DateTime<Utc>,
    offset_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            base_utc: Utc::now(),
            offset_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.offset_ms.fetch_add(ms, Ordering::Relaxed);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.offset_ms.fetch_add(ms, Ordering::Relaxed);
    }

    /// Milliseconds advanced since creation
    pub fn offset_ms(&self) -> u64 {
        self.offset_ms.load(Ordering::Relaxed)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms())
    }

    fn now_utc(&self) -> DateTime<Utc> {
        let offset = i64::try_from(self.offset_ms()).unwrap_or(i64::MAX);
        self.base_utc + chrono::Duration::milliseconds(offset)
    }
}

/// Messenger that records every reply it is asked to send
#[derive(Debug, Default)]
pub struct RecordingMessenger {
    pub sent: Vec<ReplyRequest>,
    /// When set, the next send fails with this error message
    pub fail_next: Option<String>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next send with [`MessagingError::Unreachable`]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Vec::new(),
            fail_next: Some(reason.into()),
        }
    }
}

impl Messenger for RecordingMessenger {
    fn send_reply(&mut self, reply: ReplyRequest) -> Result<(), MessagingError> {
        if let Some(reason) = self.fail_next.take() {
            return Err(MessagingError::Unreachable(reason));
        }
        self.sent.push(reply);
        Ok(())
    }
}

/// Media lifecycle call observed by [`RecordingHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCall {
    Load(MediaHandle, StoryId),
    Release(MediaHandle),
}

/// Host that records close, navigation, and media calls
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub closes: Vec<CloseReason>,
    pub routes: Vec<HostRoute>,
    pub media: Vec<MediaCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles that were loaded and not yet released
    pub fn active_media(&self) -> Vec<MediaHandle> {
        let mut active = Vec::new();
        for call in &self.media {
            match call {
                MediaCall::Load(handle, _) => active.push(*handle),
                MediaCall::Release(handle) => active.retain(|h| h != handle),
            }
        }
        active
    }

    /// Most recently loaded handle
    pub fn last_loaded(&self) -> Option<MediaHandle> {
        self.media.iter().rev().find_map(|call| match call {
            MediaCall::Load(handle, _) => Some(*handle),
            MediaCall::Release(_) => None,
        })
    }
}

impl ViewerHost for RecordingHost {
    fn load_media(&mut self, handle: MediaHandle, story: &Story) {
        self.media.push(MediaCall::Load(handle, story.id.clone()));
    }

    fn release_media(&mut self, handle: MediaHandle) {
        self.media.push(MediaCall::Release(handle));
    }

    fn close(&mut self, reason: CloseReason) {
        self.closes.push(reason);
    }

    fn navigate_to(&mut self, route: HostRoute) {
        self.routes.push(route);
    }
}
