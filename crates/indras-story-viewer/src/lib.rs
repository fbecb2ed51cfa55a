//! Headless host for the Indras story viewer
//!
//! Plays a story file through [`indras_stories::StoryViewer`] with simulated
//! media, taking user gestures as JSONL control events and rendering the
//! viewer as JSONL snapshots.

pub mod cli;
pub mod events;
pub mod host;
pub mod outbox;
pub mod output;
pub mod records;
pub mod session;

pub use host::HeadlessHost;
pub use outbox::JsonlOutbox;
pub use output::{SessionSummary, ViewerOutput};
pub use session::{SessionConfig, run_session};
