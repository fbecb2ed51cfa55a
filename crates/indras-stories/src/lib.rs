//! # Indras Stories
//!
//! Timed playback engine for ephemeral stories.
//!
//! Stories are grouped into per-author buckets and played slide by slide.
//! Each slide advances automatically when its duration elapses; the user can
//! tap, hold, or use the keyboard to navigate and pause, like a slide, or
//! reply to its author.
//!
//! ## Key Types
//!
//! - [`StoryViewer`]: A viewing session; the entry point for hosts
//! - [`NavigationController`]: The (bucket, slide) state machine
//! - [`PlaybackClock`]: Poll-driven progress with single outstanding frame tickets
//! - [`MediaSlot`]: Ownership of the one active media resource
//! - [`ErrorRecovery`]: Fallback durations for media that fails to load
//! - [`InteractionLayer`]: Input-to-action mapping
//!
//! ## Collaborators
//!
//! - [`Clock`]: Time source ([`SystemClock`] in production, [`mock::ManualClock`] in tests)
//! - [`Messenger`]: Delivers story replies
//! - [`ViewerHost`]: Loads media, closes the viewer, and switches screens
//!
//! ## Example
//!
//! ```rust,ignore
//! use indras_stories::{StoryViewer, SystemClock, ViewerConfig};
//!
//! let mut viewer = StoryViewer::open(
//!     &stories,
//!     None,
//!     ViewerConfig::default(),
//!     SystemClock,
//!     messenger,
//!     host,
//! )?;
//!
//! // Once per display frame
//! if let Some(ticket) = viewer.schedule_frame() {
//!     viewer.frame(ticket);
//! }
//! ```

pub mod bucket;
pub mod clock;
pub mod config;
pub mod error;
pub mod interaction;
pub mod media;
pub mod messaging;
pub mod mock;
pub mod navigation;
pub mod recovery;
pub mod state;
pub mod story;
pub mod viewer;

// Re-export main types
pub use bucket::{build_buckets, locate};
pub use clock::{Clock, FrameTicket, PlaybackClock, SystemClock, TickOutcome};
pub use config::{ViewerBuilder, ViewerConfig};
pub use error::{ConfigError, MessagingError, ViewerError, ViewerResult};
pub use interaction::{Action, Input, InteractionLayer, Key, LikeSet, PauseReason};
pub use media::{MediaEvent, MediaHandle, MediaSlot};
pub use messaging::{CloseReason, HostRoute, MessageKind, Messenger, ReplyRequest, ViewerHost};
pub use navigation::{NavigationController, RetreatAtStart, Step};
pub use recovery::{ErrorRecovery, Recovery};
pub use state::{PlaybackState, SlidePosition};
pub use story::{AuthorId, MediaKind, PrivacyScope, Story, StoryBucket, StoryId};
pub use viewer::{FrameOutcome, MediaView, StoryViewer, ViewerSnapshot};
