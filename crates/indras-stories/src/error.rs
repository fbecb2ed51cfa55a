//! Error types for indras-stories

use thiserror::Error;

/// Errors reported by the messaging collaborator when sending a reply
#[derive(Debug, Error)]
pub enum MessagingError {
    /// Recipient cannot receive messages from us
    #[error("recipient unreachable: {0}")]
    Unreachable(String),

    /// Message rejected by the messaging layer
    #[error("message rejected: {0}")]
    Rejected(String),

    /// Outbox or transport closed
    #[error("channel closed")]
    ChannelClosed,

    /// Generic messaging error
    #[error("messaging error: {0}")]
    Other(String),
}

/// Errors in viewer configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("previous tap zone must be a fraction in (0, 1), got {0}")]
    InvalidTapZone(f64),
}

/// Errors surfaced by the story viewer
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Opened with no stories to show
    #[error("story collection is empty")]
    EmptyCollection,

    /// Reply could not be handed to the messaging layer
    #[error("reply failed: {0}")]
    Reply(#[from] MessagingError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;
