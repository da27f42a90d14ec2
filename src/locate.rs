//! Re-reading a single message by archive and ordinal.
//!
//! Nothing is persisted between a search and a later lookup: the archive is
//! split again and the ordinal counted off. The splitter is deterministic,
//! so the same `(archive, ordinal)` pair always names the same message.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MboxError, Result};
use crate::model::message::ParsedMessage;
use crate::parser::decoder::MessageDecoder;
use crate::parser::mbox::{MboxSplitter, SplitOptions};

/// A message found by [`MessageLocator::locate`].
#[derive(Debug, Clone)]
pub struct Located {
    pub archive: PathBuf,
    pub ordinal: u64,
    pub message: ParsedMessage,
}

pub struct MessageLocator<D> {
    decoder: D,
    options: SplitOptions,
}

impl<D: MessageDecoder> MessageLocator<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            options: SplitOptions::default(),
        }
    }

    pub fn with_split_options(mut self, options: SplitOptions) -> Self {
        self.options = options;
        self
    }

    /// Fetch the message at `ordinal` in `archive`.
    ///
    /// Returns `Ok(None)` when the archive holds fewer messages. Only the
    /// target message is decoded.
    pub fn locate_in(&self, archive: &Path, ordinal: u64) -> Result<Option<ParsedMessage>> {
        let splitter = MboxSplitter::open(archive, &self.options)?;
        for item in splitter {
            let raw = item?;
            if raw.ordinal == ordinal {
                return self.decoder.decode(&raw).map(Some);
            }
        }
        Ok(None)
    }

    /// Fetch the message at `ordinal` from the first archive, in the given
    /// order, that holds that many messages.
    ///
    /// Ordinals are per archive, so with several archives the answer
    /// depends on their order; use [`locate_in`](Self::locate_in) to name
    /// the archive explicitly. Unreadable archives are skipped; a target
    /// message that fails to decode ends the lookup with that error.
    pub fn locate(&self, archives: &[PathBuf], ordinal: u64) -> Result<Located> {
        if archives.len() > 1 {
            warn!(
                archives = archives.len(),
                ordinal, "Message index is per archive; using the first archive that has it"
            );
        }

        for archive in archives {
            debug!(path = %archive.display(), "Checking file");
            match self.locate_in(archive, ordinal) {
                Ok(Some(message)) => {
                    return Ok(Located {
                        archive: archive.clone(),
                        ordinal,
                        message,
                    })
                }
                Ok(None) => {}
                Err(e @ MboxError::Io { .. }) => {
                    warn!(path = %archive.display(), error = %e, "Skipping archive");
                }
                Err(e) => return Err(e),
            }
        }

        Err(MboxError::MessageNotFound { ordinal })
    }
}
