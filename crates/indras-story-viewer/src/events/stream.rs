//! JSONL stream reader for control events
//!
//! Reads events from stdin or a file and sends them through a channel.
//! `wait` events are applied here, delaying the events that follow.

use std::path::PathBuf;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::ControlEvent;

/// Stream reader configuration
#[derive(Debug, Clone, Default)]
pub struct StreamConfig {
    /// Read from file instead of stdin
    pub file_path: Option<PathBuf>,
}

/// Start the control stream reader
///
/// Returns a channel receiver that will receive parsed events. The channel
/// closes when the input ends.
pub fn start_stream(config: StreamConfig) -> mpsc::UnboundedReceiver<ControlEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        if let Err(e) = run_stream(config, tx).await {
            tracing::error!("Control stream error: {}", e);
        }
    });

    rx
}

async fn run_stream(
    config: StreamConfig,
    tx: mpsc::UnboundedSender<ControlEvent>,
) -> anyhow::Result<()> {
    match config.file_path {
        Some(path) => {
            let file = tokio::fs::File::open(&path).await?;
            read_lines(BufReader::new(file), tx).await
        }
        None => read_lines(BufReader::new(tokio::io::stdin()), tx).await,
    }
}

pub async fn read_lines<R: tokio::io::AsyncRead + Unpin>(
    reader: BufReader<R>,
    tx: mpsc::UnboundedSender<ControlEvent>,
) -> anyhow::Result<()> {
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<ControlEvent>(line) {
            Ok(ControlEvent::Wait { ms }) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
            }
            Ok(event) => {
                if tx.send(event).is_err() {
                    // Receiver dropped, stop reading
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Failed to parse control event: {} - {}", e, line);
            }
        }
    }

    Ok(())
}
