//! Control event streaming
//!
//! Handles parsing and streaming JSONL control events that drive the viewer.

pub mod stream;
pub mod types;

pub use stream::*;
pub use types::*;
