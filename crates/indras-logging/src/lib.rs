//! JSONL logging setup for Indras story tooling
//!
//! Wires a `tracing` subscriber from a [`LogConfig`]: JSONL (default) or
//! pretty console output on stderr, plus optional file output through
//! `tracing-appender`. `RUST_LOG` overrides the configured level.
//!
//! # Quick Start
//!
//! ```ignore
//! use indras_logging::{IndrasSubscriberBuilder, LogConfig};
//!
//! // JSONL to stderr
//! let _guard = IndrasSubscriberBuilder::new().init()?;
//!
//! // Human-readable output during development
//! let _guard = IndrasSubscriberBuilder::new()
//!     .with_config(LogConfig::development())
//!     .init()?;
//! ```
//!
//! Keep the returned guard alive for as long as file output should be
//! flushed.

pub mod config;

pub use config::{ConsoleConfig, FileConfig, JsonlConfig, LogConfig, RotationStrategy};

use std::fs::{self, File};
use std::io;

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Errors from subscriber initialization
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Invalid log filter {0:?}: {1}")]
    Filter(String, String),

    #[error("Failed to open log file: {0}")]
    Io(#[from] io::Error),

    #[error("A global subscriber is already installed")]
    AlreadyInitialized,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Builder for configuring and initializing the logging subscriber
pub struct IndrasSubscriberBuilder {
    config: LogConfig,
}

impl IndrasSubscriberBuilder {
    /// Default: JSONL output to the console
    pub fn new() -> Self {
        Self {
            config: LogConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LogConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the default log level
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.config.default_level = level.into();
        self
    }

    /// Switch console output between pretty and JSONL
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.config.console.pretty = pretty;
        self.config.console.ansi = pretty;
        self
    }

    pub fn with_console(mut self, enabled: bool) -> Self {
        self.config.console.enabled = enabled;
        self
    }

    pub fn with_file_output(mut self, config: FileConfig) -> Self {
        self.config.file = Some(config);
        self
    }

    pub fn config(&self) -> &LogConfig {
        &self.config
    }

    /// Install the subscriber globally.
    ///
    /// Returns the file writer guard when file output is enabled.
    pub fn init(self) -> Result<Option<WorkerGuard>, LogError> {
        let filter = self.env_filter()?;
        let (layers, guard) = self.layers()?;

        tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .try_init()
            .map_err(|_| LogError::AlreadyInitialized)?;

        Ok(guard)
    }

    fn env_filter(&self) -> Result<EnvFilter, LogError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.config.default_level)
                .map_err(|e| LogError::Filter(self.config.default_level.clone(), e.to_string())),
        }
    }

    fn layers(&self) -> Result<(Vec<BoxedLayer>, Option<WorkerGuard>), LogError> {
        let mut layers = Vec::new();
        let mut guard = None;

        if self.config.console.enabled {
            let console = &self.config.console;
            let layer: BoxedLayer = if console.pretty {
                tracing_subscriber::fmt::layer()
                    .with_writer(io::stderr)
                    .with_ansi(console.ansi)
                    .with_target(true)
                    .boxed()
            } else {
                self.jsonl_layer(io::stderr)
            };
            layers.push(layer);
        }

        if let Some(file_config) = &self.config.file {
            let (writer, file_guard) = file_writer(file_config)?;
            layers.push(self.jsonl_layer(writer));
            guard = Some(file_guard);
        }

        Ok((layers, guard))
    }

    fn jsonl_layer<W>(&self, writer: W) -> BoxedLayer
    where
        W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
    {
        let jsonl = &self.config.jsonl;
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(jsonl.include_current_span)
            .with_span_list(jsonl.include_spans)
            .flatten_event(jsonl.flatten_events)
            .with_thread_ids(jsonl.include_thread_info)
            .with_thread_names(jsonl.include_thread_info)
            .with_file(jsonl.include_location)
            .with_line_number(jsonl.include_location)
            .with_writer(writer)
            .boxed()
    }
}

impl Default for IndrasSubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-blocking file writer. Truncates for `Never` rotation, appends otherwise.
fn file_writer(config: &FileConfig) -> Result<(NonBlocking, WorkerGuard), LogError> {
    fs::create_dir_all(&config.directory)?;
    let rotation = match config.rotation {
        RotationStrategy::Never => {
            let path = config.directory.join(format!("{}.log", config.prefix));
            let file = File::create(path)?;
            return Ok(tracing_appender::non_blocking(file));
        }
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
    };
    let appender = RollingFileAppender::new(rotation, &config.directory, &config.prefix);
    Ok(tracing_appender::non_blocking(appender))
}

/// Initialize logging with default settings (JSONL to stderr)
pub fn init_default() -> Result<(), LogError> {
    IndrasSubscriberBuilder::new().init().map(|_| ())
}

/// Initialize logging for tests; a no-op if a subscriber is already set
pub fn init_testing() {
    let _ = IndrasSubscriberBuilder::new()
        .with_config(LogConfig::testing())
        .init();
}
