//! Playback state for a viewing session

use serde::Serialize;

/// Position of a slide: bucket index plus slide index within the bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SlidePosition {
    pub bucket: usize,
    pub slide: usize,
}

impl SlidePosition {
    pub const START: SlidePosition = SlidePosition { bucket: 0, slide: 0 };

    pub fn new(bucket: usize, slide: usize) -> Self {
        Self { bucket, slide }
    }
}

/// Mutable playback state of the open viewer.
///
/// Per-slide fields (`progress`, `elapsed_ms`, `resolved_duration_ms`,
/// `media_error`) reset on every slide transition. `paused` survives
/// transitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaybackState {
    pub bucket_index: usize,
    pub slide_index: usize,
    /// Fraction of the resolved duration already played, in `[0, 1]`
    pub progress: f64,
    pub paused: bool,
    /// Milliseconds consumed of the current slide; the resume point
    pub elapsed_ms: u64,
    /// `None` while the slide's media is still loading
    pub resolved_duration_ms: Option<u64>,
    pub media_error: bool,
}

impl PlaybackState {
    pub fn at(position: SlidePosition) -> Self {
        Self {
            bucket_index: position.bucket,
            slide_index: position.slide,
            ..Default::default()
        }
    }

    pub fn position(&self) -> SlidePosition {
        SlidePosition::new(self.bucket_index, self.slide_index)
    }

    /// Move to a slide, clearing every per-slide field
    pub(crate) fn enter_slide(&mut self, position: SlidePosition) {
        self.bucket_index = position.bucket;
        self.slide_index = position.slide;
        self.progress = 0.0;
        self.elapsed_ms = 0;
        self.resolved_duration_ms = None;
        self.media_error = false;
    }

    /// Whether the slide is still waiting for its media
    pub fn is_loading(&self) -> bool {
        self.resolved_duration_ms.is_none()
    }

    /// Record elapsed time, clamped to the resolved duration, and derive progress
    pub(crate) fn set_elapsed(&mut self, elapsed_ms: u64) {
        match self.resolved_duration_ms {
            Some(duration) if duration > 0 => {
                self.elapsed_ms = elapsed_ms.min(duration);
                self.progress = (self.elapsed_ms as f64 / duration as f64).clamp(0.0, 1.0);
            }
            Some(_) => {
                self.elapsed_ms = 0;
                self.progress = 1.0;
            }
            None => {
                self.elapsed_ms = 0;
                self.progress = 0.0;
            }
        }
    }
}
