//! Reply outbox
//!
//! Stands in for the messaging subsystem: every reply is appended to a JSONL
//! sink as a `reply_sent` line.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use indras_stories::{MessagingError, Messenger, ReplyRequest};

use crate::output::ViewerOutput;

pub struct JsonlOutbox<W: Write> {
    sink: W,
    sent: usize,
}

impl<W: Write> JsonlOutbox<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, sent: 0 }
    }

    pub fn sent(&self) -> usize {
        self.sent
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl JsonlOutbox<Box<dyn Write + Send>> {
    /// Append to the file at `path`, creating it if needed, or write to
    /// stdout when no path is given
    pub fn open(path: Option<&Path>) -> io::Result<Self> {
        let sink: Box<dyn Write + Send> = match path {
            Some(path) => Box::new(OpenOptions::new().create(true).append(true).open(path)?),
            None => Box::new(io::stdout()),
        };
        Ok(Self::new(sink))
    }
}

impl<W: Write> Messenger for JsonlOutbox<W> {
    fn send_reply(&mut self, reply: ReplyRequest) -> Result<(), MessagingError> {
        ViewerOutput::ReplySent(&reply)
            .write_line(&mut self.sink)
            .map_err(|e| MessagingError::Unreachable(e.to_string()))?;
        self.sent += 1;
        Ok(())
    }
}
