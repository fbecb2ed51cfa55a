//! Media failure recovery
//!
//! A slide whose media fails to load still has to finish, otherwise the
//! whole sequence hangs on it. Recovery flags the slide and caps its play
//! length at the fallback, forcing one if no duration was known yet.

use crate::state::PlaybackState;

/// Longest play length of a slide whose media failed
pub const FALLBACK_DURATION_MS: u64 = 5_000;

/// Outcome of handling a media failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Slide flagged; the clock must start with this duration
    Forced(u64),
    /// Slide flagged; its resolved duration was capped to this value while
    /// the clock keeps running
    Capped(u64),
    /// Failure was already handled for this slide
    AlreadyHandled,
}

#[derive(Debug, Clone, Copy)]
pub struct ErrorRecovery {
    fallback_ms: u64,
}

impl ErrorRecovery {
    pub fn new(fallback_ms: u64) -> Self {
        Self { fallback_ms }
    }

    pub fn fallback_ms(&self) -> u64 {
        self.fallback_ms
    }

    /// Mark the current slide as failed. Handled once per slide, never retried.
    pub fn recover(&self, state: &mut PlaybackState) -> Recovery {
        if state.media_error {
            return Recovery::AlreadyHandled;
        }
        state.media_error = true;

        match state.resolved_duration_ms {
            Some(resolved) => {
                let capped = resolved.min(self.fallback_ms);
                state.resolved_duration_ms = Some(capped);
                // A shorter duration only raises progress
                state.set_elapsed(state.elapsed_ms);
                Recovery::Capped(capped)
            }
            None => Recovery::Forced(self.fallback_ms),
        }
    }
}

impl Default for ErrorRecovery {
    fn default() -> Self {
        Self::new(FALLBACK_DURATION_MS)
    }
}
