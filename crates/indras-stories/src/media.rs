//! Media duration resolution and media handle ownership
//!
//! Images know their play length up front. Videos only know it once the
//! host reports their metadata. Exactly one media handle is active at a
//! time; events tagged with any other handle are stale.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::story::{MediaKind, Story};

/// Identifies the media resource acquired for one slide visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaHandle(u64);

impl MediaHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "media#{}", self.0)
    }
}

/// Asynchronous signal from the host about a media resource
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Video metadata is available; `duration_secs` is the intrinsic length
    MetadataReady { handle: MediaHandle, duration_secs: f64 },
    /// The media could not be loaded
    Failed { handle: MediaHandle, reason: String },
}

impl MediaEvent {
    pub fn handle(&self) -> MediaHandle {
        match self {
            MediaEvent::MetadataReady { handle, .. } | MediaEvent::Failed { handle, .. } => *handle,
        }
    }
}

/// Play length as known on slide entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationResolution {
    /// Known immediately
    Ready(u64),
    /// Wait for [`MediaEvent::MetadataReady`]
    Pending,
}

/// Resolve the play length of a slide on entry
pub fn resolve_on_entry(story: &Story) -> DurationResolution {
    match story.media_type {
        MediaKind::Image => DurationResolution::Ready(story.fixed_duration_ms),
        MediaKind::Video => DurationResolution::Pending,
    }
}

/// Convert an intrinsic media duration to milliseconds.
///
/// Returns `None` for NaN, infinite (live streams), and non-positive values.
pub fn intrinsic_duration_ms(duration_secs: f64) -> Option<u64> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return None;
    }
    let ms = (duration_secs * 1_000.0).round();
    if ms < 1.0 {
        return None;
    }
    Some(ms.min(u64::MAX as f64) as u64)
}

/// Owner of the single active media handle
#[derive(Debug, Default)]
pub struct MediaSlot {
    next: u64,
    active: Option<MediaHandle>,
}

impl MediaSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<MediaHandle> {
        self.active
    }

    /// Take the active handle so it can be released
    pub fn release(&mut self) -> Option<MediaHandle> {
        self.active.take()
    }

    /// Allocate the handle for a new slide visit.
    ///
    /// The previous handle must have been released first.
    pub fn acquire(&mut self) -> MediaHandle {
        debug_assert!(self.active.is_none(), "previous media handle not released");
        self.next += 1;
        let handle = MediaHandle(self.next);
        self.active = Some(handle);
        handle
    }

    /// Whether an event belongs to the active handle
    pub fn is_current(&self, handle: MediaHandle) -> bool {
        self.active == Some(handle)
    }
}
