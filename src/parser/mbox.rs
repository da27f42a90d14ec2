//! Streaming MBOX splitter.
//!
//! Reads an archive line by line and yields one [`RawMessage`] per
//! `From `-delimited message. Never loads the entire file into memory and
//! never fails on bad bytes: invalid UTF-8 is replaced with U+FFFD.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MboxError, Result};
use crate::model::message::RawMessage;

/// Default read buffer size (1 MB for fast sequential reads on modern SSDs).
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024 * 1024;

/// Default maximum message size in bytes (256 MB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 256 * 1024 * 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Tuning knobs for [`MboxSplitter`].
#[derive(Debug, Clone, Copy)]
pub struct SplitOptions {
    pub read_buffer_size: usize,
    pub max_message_size: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

/// Lazy iterator over the messages of one archive.
///
/// A message starts at every physical line beginning with `From `. Text
/// before the first such line (or a whole file without any) forms message
/// 0. An empty stream yields nothing.
///
/// Read errors are yielded once as `Err` and end the iteration; messages
/// already yielded stay valid.
pub struct MboxSplitter<R> {
    reader: R,
    path: PathBuf,
    max_message_size: usize,
    line_buf: Vec<u8>,
    current: String,
    truncated: bool,
    next_ordinal: u64,
    first_line: bool,
    bytes_read: u64,
    lossy_lines: u64,
    done: bool,
}

impl MboxSplitter<BufReader<File>> {
    /// Open an archive on disk.
    pub fn open(path: impl AsRef<Path>, options: &SplitOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MboxError::io(path, e))?;
        let reader = BufReader::with_capacity(options.read_buffer_size, file);
        Ok(Self::new(reader, path).with_max_message_size(options.max_message_size))
    }
}

impl<R: BufRead> MboxSplitter<R> {
    /// Wrap any buffered reader. `path` is only used in errors and logs.
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            line_buf: Vec::with_capacity(4096),
            current: String::new(),
            truncated: false,
            next_ordinal: 0,
            first_line: true,
            bytes_read: 0,
            lossy_lines: 0,
            done: false,
        }
    }

    pub fn with_max_message_size(mut self, max: usize) -> Self {
        self.max_message_size = max;
        self
    }

    /// Bytes consumed from the underlying reader so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand out the accumulated message and advance the ordinal.
    fn take_current(&mut self) -> Option<RawMessage> {
        if self.current.is_empty() {
            return None;
        }
        let message = RawMessage {
            ordinal: self.next_ordinal,
            text: std::mem::take(&mut self.current),
        };
        self.next_ordinal += 1;
        self.truncated = false;
        Some(message)
    }

    fn append_line(&mut self, line: &str) {
        if self.current.is_empty() || self.current.len() + line.len() <= self.max_message_size {
            self.current.push_str(line);
        } else if !self.truncated {
            warn!(
                path = %self.path.display(),
                ordinal = self.next_ordinal,
                max_size = self.max_message_size,
                "Message exceeds maximum size, truncating body"
            );
            self.truncated = true;
        }
    }

    fn finish(&mut self) -> Option<RawMessage> {
        self.done = true;
        if self.lossy_lines > 0 {
            debug!(
                path = %self.path.display(),
                lines = self.lossy_lines,
                "Replaced undecodable bytes"
            );
        }
        self.take_current()
    }
}

impl<R: BufRead> Iterator for MboxSplitter<R> {
    type Item = Result<RawMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            self.line_buf.clear();
            match self.reader.read_until(b'\n', &mut self.line_buf) {
                Ok(0) => return self.finish().map(Ok),
                Ok(n) => self.bytes_read += n as u64,
                Err(e) => {
                    self.done = true;
                    return Some(Err(MboxError::io(&self.path, e)));
                }
            }

            if self.first_line {
                self.first_line = false;
                if self.line_buf.starts_with(UTF8_BOM) {
                    self.line_buf.drain(..UTF8_BOM.len());
                }
            }

            let (line, had_errors) =
                encoding_rs::UTF_8.decode_without_bom_handling(&self.line_buf);
            if had_errors {
                self.lossy_lines += 1;
            }
            let line = line.into_owned();

            if is_mbox_separator(line.as_bytes()) {
                if let Some(message) = self.take_current() {
                    self.current.push_str(&line);
                    return Some(Ok(message));
                }
            }
            self.append_line(&line);
        }
    }
}

/// Check whether a line is an MBOX separator (`From ` at column 0).
fn is_mbox_separator(line: &[u8]) -> bool {
    line.starts_with(b"From ")
}
