//! Indras Story Viewer - headless entry point
//!
//! Usage:
//!   story-viewer stories.jsonl < gestures.jsonl
//!   story-viewer stories.jsonl --commands gestures.jsonl --outbox replies.jsonl

use std::io;

use anyhow::Context;
use clap::Parser;

use indras_logging::{FileConfig, IndrasSubscriberBuilder, RotationStrategy};
use indras_stories::{StoryId, SystemClock};
use indras_story_viewer::cli::Args;
use indras_story_viewer::events::{StreamConfig, start_stream};
use indras_story_viewer::records::load_records;
use indras_story_viewer::{JsonlOutbox, SessionConfig, run_session};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logging = IndrasSubscriberBuilder::new()
        .with_level(&args.log_level)
        .with_pretty(args.pretty);
    if let Some(dir) = &args.log_dir {
        logging = logging.with_file_output(FileConfig {
            directory: dir.clone(),
            prefix: "story-viewer".to_string(),
            rotation: RotationStrategy::Never,
        });
    }
    let _log_guard = logging.init()?;

    let config = SessionConfig {
        records: load_records(&args.stories)?,
        start: args.start.clone().map(StoryId::new),
        viewer: args.viewer_config()?,
    };

    let outbox = JsonlOutbox::open(args.outbox.as_deref())
        .with_context(|| format!("Failed to open outbox {:?}", args.outbox))?;

    let commands = start_stream(StreamConfig {
        file_path: args.commands.clone(),
    });

    let mut out = io::stdout();
    let summary = run_session(config, SystemClock, outbox, commands, &mut out).await?;

    tracing::debug!(?summary, "Exiting");
    Ok(())
}
