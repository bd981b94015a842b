use std::io::BufRead;

use crate::agent::schema::StreamEvent;
use crate::error::{Error, Result};

/// Lazy NDJSON event reader over a live response body.
///
/// Single-pass and not restartable: the adapter drains it to completion or
/// aborts the whole invocation. Blank lines (keep-alives) are skipped; a
/// line that is neither blank nor valid JSON ends the iteration with
/// `Error::Decode`, because a corrupt frame means the rest of the stream
/// cannot be trusted.
pub struct EventStream<R: BufRead> {
    lines: std::io::Lines<R>,
    failed: bool,
}

impl<R: BufRead> EventStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            failed: false,
        }
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<StreamEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(Error::Io(err)));
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            return match serde_json::from_str::<StreamEvent>(&line) {
                Ok(event) => Some(Ok(event)),
                Err(err) => {
                    self.failed = true;
                    Some(Err(Error::Decode(err)))
                }
            };
        }
    }
}
