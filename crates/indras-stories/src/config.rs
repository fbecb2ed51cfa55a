//! Viewer configuration
//!
//! Defaults match the usual story UX; hosts can override any field through
//! [`ViewerBuilder`] or by deserializing a [`ViewerConfig`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::navigation::RetreatAtStart;
use crate::recovery::FALLBACK_DURATION_MS;

/// Fraction of the slide width, from the left edge, that taps "previous"
pub const DEFAULT_PREVIOUS_ZONE: f64 = 0.3;

/// How long the like acknowledgment stays visible
pub const DEFAULT_LIKE_ACK_MS: u64 = 800;

/// Frame interval for hosts without a display-driven frame callback
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// Configuration for a [`StoryViewer`](crate::StoryViewer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Duration forced on slides whose media failed to load
    pub fallback_duration_ms: u64,
    /// Left share of the slide that maps taps to "previous"
    pub previous_zone_fraction: f64,
    /// Lifetime of the like acknowledgment
    pub like_ack_ms: u64,
    /// Behavior when retreating from the very first slide
    pub retreat_at_start: RetreatAtStart,
    /// Interval between frames when the host polls on a timer
    pub frame_interval_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fallback_duration_ms: FALLBACK_DURATION_MS,
            previous_zone_fraction: DEFAULT_PREVIOUS_ZONE,
            like_ack_ms: DEFAULT_LIKE_ACK_MS,
            retreat_at_start: RetreatAtStart::Stay,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl ViewerConfig {
    /// Check the configuration for values the viewer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fallback_duration_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "fallback_duration_ms",
            });
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "frame_interval_ms",
            });
        }
        let zone = self.previous_zone_fraction;
        if !(zone > 0.0 && zone < 1.0) {
            return Err(ConfigError::InvalidTapZone(zone));
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn like_ack(&self) -> Duration {
        Duration::from_millis(self.like_ack_ms)
    }
}

/// Builder for [`ViewerConfig`]
#[derive(Debug, Clone, Default)]
pub struct ViewerBuilder {
    config: ViewerConfig,
}

impl ViewerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fallback_duration_ms(mut self, ms: u64) -> Self {
        self.config.fallback_duration_ms = ms;
        self
    }

    pub fn previous_zone_fraction(mut self, fraction: f64) -> Self {
        self.config.previous_zone_fraction = fraction;
        self
    }

    pub fn like_ack_ms(mut self, ms: u64) -> Self {
        self.config.like_ack_ms = ms;
        self
    }

    pub fn retreat_at_start(mut self, policy: RetreatAtStart) -> Self {
        self.config.retreat_at_start = policy;
        self
    }

    pub fn frame_interval_ms(mut self, ms: u64) -> Self {
        self.config.frame_interval_ms = ms;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<ViewerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
