//! File-based log source.

use super::LineReader;
use crate::model::error::InputError;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// A saved log file, read once from start to end.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    lines: LineReader<BufReader<File>>,
}

impl FileSource {
    /// Open the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `InputError::FileNotFound` if the file does not exist.
    /// Returns `InputError::Io` for other I/O errors.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(InputError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            lines: LineReader::new(BufReader::new(file)),
        })
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the next line; `Ok(None)` at end of file.
    ///
    /// # Errors
    ///
    /// Returns `InputError::Io` for I/O errors.
    pub fn next_line(&mut self) -> Result<Option<String>, InputError> {
        self.lines.next_line()
    }

    /// Number of lines read so far.
    pub fn lines_read(&self) -> usize {
        self.lines.lines_read()
    }
}
