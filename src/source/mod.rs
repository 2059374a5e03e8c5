//! Log input sources.
//!
//! This module provides line sources for engine logs:
//! - File input for a saved log
//! - Stdin for piped input
//! - Unified InputSource enum for both
//!
//! Lines are decoded as lossy UTF-8 so a stray invalid byte never stops the
//! analysis. Line terminators (`\n`, `\r\n`) are removed.

use crate::model::error::InputError;
use std::io::BufRead;
use std::path::PathBuf;

pub mod file;
pub mod stdin;

pub use file::FileSource;
pub use stdin::StdinSource;

/// Reads terminator-stripped, lossily decoded lines from any buffered reader.
#[derive(Debug)]
pub struct LineReader<R: BufRead> {
    reader: R,
    buffer: Vec<u8>,
    lines_read: usize,
    complete: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            lines_read: 0,
            complete: false,
        }
    }

    /// Read the next line.
    ///
    /// Returns `Ok(None)` at end of input. A final line without a trailing
    /// newline is still returned.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` for I/O errors.
    pub fn next_line(&mut self) -> Result<Option<String>, InputError> {
        if self.complete {
            return Ok(None);
        }

        self.buffer.clear();
        let bytes_read = self.reader.read_until(b'\n', &mut self.buffer)?;
        if bytes_read == 0 {
            self.complete = true;
            return Ok(None);
        }

        let mut line = self.buffer.as_slice();
        if let Some(stripped) = line.strip_suffix(b"\n") {
            line = stripped;
        }
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }

        self.lines_read += 1;
        Ok(Some(String::from_utf8_lossy(line).into_owned()))
    }

    /// Number of lines returned so far.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Whether end of input has been reached.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = Result<String, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

/// Unified input source for log lines.
///
/// Abstracts over file and stdin sources with a common interface.
/// Sum type enforces exactly one variant.
#[derive(Debug)]
pub enum InputSource {
    /// A log file on disk
    File(FileSource),
    /// Piped stdin
    Stdin(StdinSource),
}

impl InputSource {
    /// Read the next line from the source.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` for I/O errors.
    pub fn next_line(&mut self) -> Result<Option<String>, InputError> {
        match self {
            InputSource::File(f) => f.next_line(),
            InputSource::Stdin(s) => s.next_line(),
        }
    }

    /// Short human-readable name for log output.
    pub fn describe(&self) -> String {
        match self {
            InputSource::File(f) => f.path().display().to_string(),
            InputSource::Stdin(_) => "<stdin>".to_string(),
        }
    }
}

impl Iterator for InputSource {
    type Item = Result<String, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

/// Detect and create appropriate input source.
///
/// # Logic:
/// 1. If file path is provided: open a FileSource
/// 2. If stdin is piped: use StdinSource
/// 3. Else: return InputError::NoInput
///
/// # Errors
///
/// Returns `InputError::NoInput` if no file is provided and stdin is a terminal.
/// Returns `InputError::FileNotFound` if file does not exist.
/// Returns `InputError::Io` for I/O errors while opening the file.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => Ok(InputSource::File(FileSource::new(path)?)),
        None => Ok(InputSource::Stdin(StdinSource::new()?)),
    }
}
