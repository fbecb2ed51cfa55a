//! Navigation state machine
//!
//! Tracks the (bucket, slide) position inside [`PlaybackState`] and applies
//! advance / retreat / jump transitions. Every transition resets the
//! per-slide fields of the state.

use serde::{Deserialize, Serialize};

use crate::bucket;
use crate::error::{ViewerError, ViewerResult};
use crate::state::{PlaybackState, SlidePosition};
use crate::story::{Story, StoryBucket, StoryId};

/// What retreating from the very first slide does
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetreatAtStart {
    /// Stay on the first slide
    #[default]
    Stay,
    /// Treat it like running off the end and close the viewer
    Close,
}

/// Result of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Moved to a new slide; per-slide state has been reset
    Moved(SlidePosition),
    /// Nothing changed
    Unchanged,
    /// The sequence is finished; the viewer must close
    Exhausted,
}

impl Step {
    pub fn is_transition(&self) -> bool {
        matches!(self, Step::Moved(_))
    }
}

/// Central (bucket, slide) state machine
#[derive(Debug, Clone)]
pub struct NavigationController {
    buckets: Vec<StoryBucket>,
    state: PlaybackState,
    retreat_at_start: RetreatAtStart,
}

impl NavigationController {
    /// Create a controller positioned at `start`, or at the first slide when
    /// `start` is absent or unknown. Empty buckets are dropped.
    pub fn new(
        buckets: Vec<StoryBucket>,
        start: Option<&StoryId>,
        retreat_at_start: RetreatAtStart,
    ) -> ViewerResult<Self> {
        let buckets: Vec<StoryBucket> = buckets.into_iter().filter(|b| !b.is_empty()).collect();
        if buckets.is_empty() {
            return Err(ViewerError::EmptyCollection);
        }

        let position = start
            .and_then(|id| bucket::locate(&buckets, id))
            .unwrap_or(SlidePosition::START);

        Ok(Self {
            buckets,
            state: PlaybackState::at(position),
            retreat_at_start,
        })
    }

    pub fn buckets(&self) -> &[StoryBucket] {
        &self.buckets
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn position(&self) -> SlidePosition {
        self.state.position()
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut PlaybackState {
        &mut self.state
    }

    pub fn current_bucket(&self) -> &StoryBucket {
        &self.buckets[self.state.bucket_index]
    }

    pub fn current_story(&self) -> &Story {
        &self.current_bucket().stories[self.state.slide_index]
    }

    /// Move forward one slide, crossing into the next bucket at the end of
    /// the current one.
    pub fn advance(&mut self) -> Step {
        let SlidePosition { bucket, slide } = self.position();

        if slide < self.buckets[bucket].last_slide() {
            self.move_to(SlidePosition::new(bucket, slide + 1))
        } else if bucket + 1 < self.buckets.len() {
            self.move_to(SlidePosition::new(bucket + 1, 0))
        } else {
            Step::Exhausted
        }
    }

    /// Move back one slide, landing on the previous bucket's last slide at
    /// the start of the current one.
    pub fn retreat(&mut self) -> Step {
        let SlidePosition { bucket, slide } = self.position();

        if slide > 0 {
            self.move_to(SlidePosition::new(bucket, slide - 1))
        } else if bucket > 0 {
            let last = self.buckets[bucket - 1].last_slide();
            self.move_to(SlidePosition::new(bucket - 1, last))
        } else {
            match self.retreat_at_start {
                RetreatAtStart::Stay => Step::Unchanged,
                RetreatAtStart::Close => Step::Exhausted,
            }
        }
    }

    /// Jump to a story by id. Unknown ids leave the position untouched.
    pub fn jump_to(&mut self, id: &StoryId) -> Step {
        match bucket::locate(&self.buckets, id) {
            Some(position) => self.move_to(position),
            None => Step::Unchanged,
        }
    }

    fn move_to(&mut self, position: SlidePosition) -> Step {
        self.state.enter_slide(position);
        Step::Moved(position)
    }
}
