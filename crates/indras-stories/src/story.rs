//! Story and bucket types
//!
//! Stories are produced by the capture pipeline and handed to the viewer
//! as an immutable snapshot. The viewer never mutates them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Play length for image slides when the story does not carry its own.
pub const DEFAULT_IMAGE_DURATION_MS: u64 = 5_000;

/// Unique identifier for a story
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub String);

impl StoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for StoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of the member who posted a story
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(pub String);

impl AuthorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AuthorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AuthorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of media a story carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

/// Audience a story was shared with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyScope {
    #[default]
    Public,
    Contacts,
    CloseFriends,
}

fn default_fixed_duration() -> u64 {
    DEFAULT_IMAGE_DURATION_MS
}

/// A single ephemeral media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: StoryId,
    pub author_id: AuthorId,
    pub media_type: MediaKind,
    pub media_url: String,
    /// Play length for images. Ignored for videos, which use the
    /// intrinsic duration reported by the media.
    #[serde(default = "default_fixed_duration")]
    pub fixed_duration_ms: u64,
    #[serde(default)]
    pub privacy: PrivacyScope,
    pub posted_at: DateTime<Utc>,
}

impl Story {
    /// Create an image story with the default duration
    pub fn image(
        id: impl Into<StoryId>,
        author_id: impl Into<AuthorId>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            media_type: MediaKind::Image,
            media_url: media_url.into(),
            fixed_duration_ms: DEFAULT_IMAGE_DURATION_MS,
            privacy: PrivacyScope::Public,
            posted_at: Utc::now(),
        }
    }

    /// Create a video story
    pub fn video(
        id: impl Into<StoryId>,
        author_id: impl Into<AuthorId>,
        media_url: impl Into<String>,
    ) -> Self {
        Self {
            media_type: MediaKind::Video,
            ..Self::image(id, author_id, media_url)
        }
    }

    /// Override the image play length
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.fixed_duration_ms = duration_ms;
        self
    }

    pub fn is_video(&self) -> bool {
        self.media_type == MediaKind::Video
    }
}

/// One author's ordered stack of stories, shown consecutively
#[derive(Debug, Clone, PartialEq)]
pub struct StoryBucket {
    pub author_id: AuthorId,
    pub stories: Vec<Story>,
}

impl StoryBucket {
    pub fn new(author_id: AuthorId) -> Self {
        Self {
            author_id,
            stories: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.stories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stories.is_empty()
    }

    pub fn get(&self, slide: usize) -> Option<&Story> {
        self.stories.get(slide)
    }

    /// Index of the last slide (0 for an empty bucket)
    pub fn last_slide(&self) -> usize {
        self.stories.len().saturating_sub(1)
    }

    pub fn position_of(&self, id: &StoryId) -> Option<usize> {
        self.stories.iter().position(|s| &s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_story_defaults() {
        let json = r#"{"id":"s1","author_id":"alice","media_type":"image","media_url":"https://cdn/s1.jpg","posted_at":"2026-01-01T10:00:00Z"}"#;
        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.id.as_str(), "s1");
        assert_eq!(story.media_type, MediaKind::Image);
        assert_eq!(story.fixed_duration_ms, DEFAULT_IMAGE_DURATION_MS);
        assert_eq!(story.privacy, PrivacyScope::Public);
    }

    #[test]
    fn test_parse_video_story() {
        let json = r#"{"id":"v1","author_id":"bob","media_type":"video","media_url":"https://cdn/v1.mp4","privacy":"close_friends","posted_at":"2026-01-01T10:00:00Z"}"#;
        let story: Story = serde_json::from_str(json).unwrap();
        assert!(story.is_video());
        assert_eq!(story.privacy, PrivacyScope::CloseFriends);
    }

    #[test]
    fn test_bucket_position_of() {
        let mut bucket = StoryBucket::new(AuthorId::new("alice"));
        bucket.stories.push(Story::image("a", "alice", "a.jpg"));
        bucket.stories.push(Story::image("b", "alice", "b.jpg"));
        assert_eq!(bucket.position_of(&StoryId::new("b")), Some(1));
        assert_eq!(bucket.position_of(&StoryId::new("z")), None);
        assert_eq!(bucket.last_slide(), 1);
    }
}
