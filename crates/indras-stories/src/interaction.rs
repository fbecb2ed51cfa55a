//! Interaction layer
//!
//! Maps raw user input (taps, holds, keys, like and reply actions) to
//! viewer actions, and holds the session-local interaction state: the like
//! set, the like acknowledgment, the reply field, and the set of reasons the
//! slide is currently paused for.

use std::collections::HashSet;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::story::StoryId;

/// Keys the viewer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Escape,
    Space,
    Enter,
}

impl FromStr for Key {
    type Err = String;

    /// Parses DOM-style key names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ArrowRight" | "Right" => Ok(Key::ArrowRight),
            "ArrowLeft" | "Left" => Ok(Key::ArrowLeft),
            "Escape" | "Esc" => Ok(Key::Escape),
            " " | "Space" | "Spacebar" => Ok(Key::Space),
            "Enter" => Ok(Key::Enter),
            other => Err(format!("unhandled key: {}", other)),
        }
    }
}

/// Raw input delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Tap at horizontal offset `x` on a slide `width` wide
    Tap { x: f64, width: f64 },
    PressStart,
    PressEnd,
    Key(Key),
    ToggleLike,
    ReplyFocus,
    ReplyBlur,
    /// Reply field contents changed
    ReplyChanged(String),
    SubmitReply,
    /// Close button
    Close,
}

/// What an input asks the viewer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Advance,
    Retreat,
    Close,
    Hold,
    Release,
    TogglePause,
    ToggleLike,
    FocusReply,
    BlurReply,
    EditReply,
    SubmitReply,
    Ignore,
}

/// Why the slide is paused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseReason {
    /// Press-and-hold on the slide
    Hold,
    /// Toggled with the space key
    Manual,
    /// Reply field has focus
    ReplyFocus,
    /// Reply field lost focus with an unsent draft
    ReplyDraft,
}

/// Set of active pause reasons; paused while non-empty
#[derive(Debug, Clone, Default)]
pub struct PauseReasons(HashSet<PauseReason>);

impl PauseReasons {
    /// Add a reason. Returns true if this paused a running slide.
    pub fn insert(&mut self, reason: PauseReason) -> bool {
        let was_empty = self.0.is_empty();
        self.0.insert(reason);
        was_empty
    }

    /// Remove a reason. Returns true if this lifted the last one.
    pub fn remove(&mut self, reason: PauseReason) -> bool {
        self.0.remove(&reason) && self.0.is_empty()
    }

    pub fn contains(&self, reason: PauseReason) -> bool {
        self.0.contains(&reason)
    }

    pub fn is_paused(&self) -> bool {
        !self.0.is_empty()
    }
}

/// Stories liked during this session
#[derive(Debug, Clone, Default)]
pub struct LikeSet(HashSet<StoryId>);

impl LikeSet {
    /// Toggle a story. Returns true if it is now liked.
    pub fn toggle(&mut self, id: &StoryId) -> bool {
        if self.0.remove(id) {
            false
        } else {
            self.0.insert(id.clone());
            true
        }
    }

    pub fn contains(&self, id: &StoryId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoryId> {
        self.0.iter()
    }
}

/// Transient "liked" acknowledgment that dismisses itself
#[derive(Debug, Clone, Copy, Default)]
pub struct LikeAck {
    visible_until: Option<Instant>,
}

impl LikeAck {
    pub fn show(&mut self, now: Instant, lifetime: Duration) {
        self.visible_until = Some(now + lifetime);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.visible_until.is_some_and(|until| now < until)
    }

    /// Drop the acknowledgment once expired. Returns true if it was dismissed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.visible_until.is_some() && !self.is_visible(now) {
            self.visible_until = None;
            return true;
        }
        false
    }
}

/// Reply text field
#[derive(Debug, Clone, Default)]
pub struct ReplyField {
    pub text: String,
    pub focused: bool,
}

impl ReplyField {
    /// Whether there is something worth sending
    pub fn has_draft(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

/// Input-to-action mapping for the slide surface and keyboard
#[derive(Debug, Clone, Copy)]
pub struct InteractionLayer {
    previous_zone: f64,
}

impl InteractionLayer {
    pub fn new(previous_zone: f64) -> Self {
        Self { previous_zone }
    }

    /// Map an input to an action. Space is swallowed while the reply field
    /// has focus, since it is typing.
    pub fn translate(&self, input: &Input, reply_focused: bool) -> Action {
        match input {
            Input::Tap { x, width } => self.tap(*x, *width),
            Input::PressStart => Action::Hold,
            Input::PressEnd => Action::Release,
            Input::Key(key) => match key {
                Key::ArrowRight => Action::Advance,
                Key::ArrowLeft => Action::Retreat,
                Key::Escape => Action::Close,
                Key::Space if reply_focused => Action::Ignore,
                Key::Space => Action::TogglePause,
                Key::Enter => Action::SubmitReply,
            },
            Input::ToggleLike => Action::ToggleLike,
            Input::ReplyFocus => Action::FocusReply,
            Input::ReplyBlur => Action::BlurReply,
            Input::ReplyChanged(_) => Action::EditReply,
            Input::SubmitReply => Action::SubmitReply,
            Input::Close => Action::Close,
        }
    }

    fn tap(&self, x: f64, width: f64) -> Action {
        if !(width.is_finite() && width > 0.0) || !x.is_finite() {
            return Action::Ignore;
        }
        if x / width < self.previous_zone {
            Action::Retreat
        } else {
            Action::Advance
        }
    }
}

impl Default for InteractionLayer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PREVIOUS_ZONE)
    }
}
