//! Control event definitions
//!
//! Each JSONL line stands in for one user gesture on the viewer.

use serde::Deserialize;

use indras_stories::{Input, Key, StoryId};

/// All control events the headless viewer accepts
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event_type")]
pub enum ControlEvent {
    #[serde(rename = "tap")]
    Tap {
        x: f64,
        #[serde(default = "default_width")]
        width: f64,
    },

    #[serde(rename = "press_start")]
    PressStart,

    #[serde(rename = "press_end")]
    PressEnd,

    /// DOM-style key name, e.g. "ArrowRight" or " "
    #[serde(rename = "key")]
    Key { key: String },

    #[serde(rename = "toggle_like")]
    ToggleLike,

    #[serde(rename = "reply_focus")]
    ReplyFocus,

    #[serde(rename = "reply_blur")]
    ReplyBlur,

    #[serde(rename = "reply_changed")]
    ReplyChanged {
        #[serde(default)]
        text: String,
    },

    #[serde(rename = "submit_reply")]
    SubmitReply,

    #[serde(rename = "close")]
    Close,

    #[serde(rename = "jump")]
    Jump { story_id: StoryId },

    /// Hold the remaining events back for `ms` milliseconds
    #[serde(rename = "wait")]
    Wait { ms: u64 },

    /// Emit a snapshot of the viewer
    #[serde(rename = "snapshot")]
    Snapshot,

    /// Catch-all for unknown event types
    #[serde(other)]
    Unknown,
}

fn default_width() -> f64 {
    1.0
}

/// What the session should do with a control event
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Input(Input),
    Jump(StoryId),
    Snapshot,
    Ignore,
}

impl ControlEvent {
    pub fn into_control(self) -> Control {
        let input = match self {
            ControlEvent::Tap { x, width } => Input::Tap { x, width },
            ControlEvent::PressStart => Input::PressStart,
            ControlEvent::PressEnd => Input::PressEnd,
            ControlEvent::Key { key } => match key.parse::<Key>() {
                Ok(key) => Input::Key(key),
                Err(e) => {
                    tracing::trace!("{}", e);
                    return Control::Ignore;
                }
            },
            ControlEvent::ToggleLike => Input::ToggleLike,
            ControlEvent::ReplyFocus => Input::ReplyFocus,
            ControlEvent::ReplyBlur => Input::ReplyBlur,
            ControlEvent::ReplyChanged { text } => Input::ReplyChanged(text),
            ControlEvent::SubmitReply => Input::SubmitReply,
            ControlEvent::Close => Input::Close,
            ControlEvent::Jump { story_id } => return Control::Jump(story_id),
            ControlEvent::Snapshot => return Control::Snapshot,
            ControlEvent::Wait { .. } | ControlEvent::Unknown => return Control::Ignore,
        };
        Control::Input(input)
    }
}
