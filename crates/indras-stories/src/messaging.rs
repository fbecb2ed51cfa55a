//! Collaborator interfaces
//!
//! The viewer does not deliver messages or draw anything itself. Replies go
//! to a [`Messenger`]; close, navigation, and media lifecycle calls go to the
//! [`ViewerHost`].

use serde::{Deserialize, Serialize};

use crate::error::MessagingError;
use crate::media::MediaHandle;
use crate::story::{AuthorId, Story, StoryId};

/// Kind tag on messages originating from the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    StoryReply,
}

/// A reply to a story, addressed to its author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRequest {
    pub recipient: AuthorId,
    pub text: String,
    pub kind: MessageKind,
    pub referenced_media_url: String,
    pub story_id: StoryId,
}

impl ReplyRequest {
    pub fn story_reply(story: &Story, text: impl Into<String>) -> Self {
        Self {
            recipient: story.author_id.clone(),
            text: text.into(),
            kind: MessageKind::StoryReply,
            referenced_media_url: story.media_url.clone(),
            story_id: story.id.clone(),
        }
    }
}

/// Messaging subsystem that persists and delivers replies
pub trait Messenger {
    fn send_reply(&mut self, reply: ReplyRequest) -> Result<(), MessagingError>;
}

/// Why the viewer closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Ran past the last slide
    Exhausted,
    /// Dismissed by the user
    Dismissed,
    /// Closed after handing a reply to messaging
    ReplySent,
}

/// Screens the host can switch to when the viewer hands off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostRoute {
    Messages,
}

/// Screen hosting the viewer
pub trait ViewerHost {
    /// Start loading media for the slide that now owns `handle`
    fn load_media(&mut self, handle: MediaHandle, story: &Story);

    /// Stop playback and drop every reference held for `handle`
    fn release_media(&mut self, handle: MediaHandle);

    /// The viewer is finished; called once
    fn close(&mut self, reason: CloseReason);

    fn navigate_to(&mut self, route: HostRoute);
}
