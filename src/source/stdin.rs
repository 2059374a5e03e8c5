//! Stdin-based log source for piped input.
//!
//! Supports both `cat session.log | culling-log-parser` and a log still being
//! written (`tail -f ... |`); lines are processed as they arrive and the
//! analysis completes at EOF.

use super::LineReader;
use crate::model::error::InputError;
use std::io::{BufRead, IsTerminal, StdinLock};

/// Stdin source for piped log input.
///
/// Detects TTY vs piped input at construction so the program never blocks
/// waiting for a user to type a log.
#[derive(Debug)]
pub struct StdinSource<R: BufRead = StdinLock<'static>> {
    lines: LineReader<R>,
}

impl StdinSource {
    /// Create a new StdinSource from stdin.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NoInput` if stdin is a TTY (interactive terminal).
    pub fn new() -> Result<Self, InputError> {
        let stdin = std::io::stdin();
        if stdin.is_terminal() {
            return Err(InputError::NoInput);
        }
        Ok(Self {
            lines: LineReader::new(stdin.lock()),
        })
    }
}

impl<R: BufRead> StdinSource<R> {
    /// Create StdinSource from any reader, bypassing the TTY check.
    #[cfg(test)]
    fn from_reader(reader: R) -> Self {
        Self {
            lines: LineReader::new(reader),
        }
    }

    /// Read the next line, blocking until one is available.
    ///
    /// Returns `Ok(None)` once EOF is reached.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` for I/O errors.
    pub fn next_line(&mut self) -> Result<Option<String>, InputError> {
        self.lines.next_line()
    }

    /// Check if EOF has been reached (no more data will arrive).
    pub fn is_complete(&self) -> bool {
        self.lines.is_complete()
    }
}
