//! Playback clock
//!
//! Poll-driven: the host asks for a [`FrameTicket`] once per frame and hands
//! it back on the next frame. Only one ticket is outstanding at a time, and
//! every pause, cancel, or slide transition invalidates it, so a late frame
//! can never touch a slide it was not issued for.
//!
//! Time comes from a [`Clock`], which keeps the state machine testable with
//! a manual clock.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::state::PlaybackState;

/// Time source for the playback clock
pub trait Clock: Send + Sync {
    /// Current monotonic instant
    fn now(&self) -> Instant;

    /// Current wall-clock time, used only for display
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Monotonic system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Permission to advance the clock by one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    generation: u64,
}

/// Result of polling the clock with a ticket
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Ticket was invalidated; nothing changed
    Stale,
    /// Progress after this frame
    Progress(f64),
    /// The slide just reached full progress. Reported once per slide.
    Completed,
}

#[derive(Debug, Clone, Copy)]
struct RunSegment {
    started_at: Instant,
    elapsed_at_start: u64,
}

impl RunSegment {
    fn elapsed_ms(&self, now: Instant) -> u64 {
        let delta = now.saturating_duration_since(self.started_at);
        self.elapsed_at_start
            .saturating_add(u64::try_from(delta.as_millis()).unwrap_or(u64::MAX))
    }
}

/// Advances slide progress from 0 to 1 over the resolved duration.
///
/// `PlaybackState::elapsed_ms` is the resume point: pausing folds the running
/// segment into it, resuming starts a new segment from it.
#[derive(Debug)]
pub struct PlaybackClock<C: Clock> {
    clock: C,
    generation: u64,
    outstanding: Option<FrameTicket>,
    run: Option<RunSegment>,
    completed: bool,
}

impl<C: Clock> PlaybackClock<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            generation: 0,
            outstanding: None,
            run: None,
            completed: false,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Record the resolved duration and run from the current elapsed
    /// position, unless paused. Never rewinds.
    pub fn start(&mut self, state: &mut PlaybackState, duration_ms: u64) {
        state.resolved_duration_ms = Some(duration_ms);
        state.set_elapsed(state.elapsed_ms);

        if self.run.is_none() && !state.paused && !self.completed {
            self.begin(state);
        }
    }

    /// Freeze progress, folding the running segment into `elapsed_ms`
    pub fn pause(&mut self, state: &mut PlaybackState) {
        state.paused = true;
        if let Some(run) = self.run.take() {
            state.set_elapsed(run.elapsed_ms(self.clock.now()));
        }
        self.invalidate();
    }

    /// Continue from `elapsed_ms`. Stays idle until a duration is known.
    pub fn resume(&mut self, state: &mut PlaybackState) {
        state.paused = false;
        if self.run.is_none() && !self.completed && state.resolved_duration_ms.is_some() {
            self.begin(state);
        }
    }

    /// Stop running and drop the outstanding ticket. Used on slide
    /// transitions and on close.
    pub fn cancel(&mut self) {
        self.run = None;
        self.completed = false;
        self.invalidate();
    }

    /// Issue the ticket for the next frame.
    ///
    /// Returns `None` while idle or when a ticket is already outstanding.
    pub fn arm(&mut self) -> Option<FrameTicket> {
        if self.run.is_none() || self.outstanding.is_some() {
            return None;
        }
        let ticket = FrameTicket {
            generation: self.generation,
        };
        self.outstanding = Some(ticket);
        Some(ticket)
    }

    /// Redeem a ticket, updating `elapsed_ms` and `progress`
    pub fn poll(&mut self, ticket: FrameTicket, state: &mut PlaybackState) -> TickOutcome {
        if self.outstanding != Some(ticket) {
            return TickOutcome::Stale;
        }
        self.outstanding = None;

        let Some(run) = self.run else {
            return TickOutcome::Stale;
        };

        state.set_elapsed(run.elapsed_ms(self.clock.now()));
        if state.progress >= 1.0 {
            self.run = None;
            self.completed = true;
            TickOutcome::Completed
        } else {
            TickOutcome::Progress(state.progress)
        }
    }

    /// Time left on the current slide, if known
    pub fn remaining(&self, state: &PlaybackState) -> Option<Duration> {
        let duration = state.resolved_duration_ms?;
        let elapsed = match self.run {
            Some(run) => run.elapsed_ms(self.clock.now()).min(duration),
            None => state.elapsed_ms,
        };
        Some(Duration::from_millis(duration - elapsed.min(duration)))
    }

    fn begin(&mut self, state: &PlaybackState) {
        self.invalidate();
        self.run = Some(RunSegment {
            started_at: self.clock.now(),
            elapsed_at_start: state.elapsed_ms,
        });
    }

    fn invalidate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.outstanding = None;
    }
}
