//! Driving a full scan: split, decode, and match every archive in turn.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::record::ResultsIndex;
use crate::parser::decoder::MessageDecoder;
use crate::parser::mbox::{MboxSplitter, SplitOptions};

use super::match_log::{format_notice, MatchLog};
use super::matcher::CompiledTerms;
use super::term::SearchTermSet;

/// Counters collected during one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Archives read to the end.
    pub archives_scanned: usize,
    /// Archives that could not be opened or broke off mid-read.
    pub archives_failed: usize,
    pub messages_scanned: u64,
    pub decode_failures: u64,
    pub bytes_read: u64,
    /// The progress callback asked to stop before every archive was read.
    pub cancelled: bool,
}

/// Runs searches over a list of archives.
///
/// Archives are processed one after another in the order given, so the
/// resulting [`ResultsIndex`] is ordered by archive, then by ordinal.
/// Failures are contained: an unreadable archive is skipped, an
/// undecodable message is skipped, and the scan carries on.
pub struct SearchCoordinator<'a, D> {
    decoder: D,
    options: SplitOptions,
    match_log: Option<&'a MatchLog>,
}

impl<'a, D: MessageDecoder> SearchCoordinator<'a, D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            options: SplitOptions::default(),
            match_log: None,
        }
    }

    pub fn with_split_options(mut self, options: SplitOptions) -> Self {
        self.options = options;
        self
    }

    /// Append a notice to `log` for every match.
    pub fn with_match_log(mut self, log: &'a MatchLog) -> Self {
        self.match_log = Some(log);
        self
    }

    /// Search every archive and return all matches.
    pub fn search(
        &self,
        archives: &[PathBuf],
        terms: &SearchTermSet,
        exact: bool,
    ) -> Result<(ResultsIndex, SearchSummary)> {
        self.search_with_progress(archives, terms, exact, None)
    }

    /// Like [`search`](Self::search), reporting progress between archives.
    ///
    /// The callback receives `(archives_done, archives_total)` before each
    /// archive and once at the end; returning `false` stops the scan and
    /// keeps the matches found so far.
    pub fn search_with_progress(
        &self,
        archives: &[PathBuf],
        terms: &SearchTermSet,
        exact: bool,
        progress: Option<&dyn Fn(usize, usize) -> bool>,
    ) -> Result<(ResultsIndex, SearchSummary)> {
        let compiled = CompiledTerms::compile(terms, exact)?;
        let mut results = ResultsIndex::new();
        let mut summary = SearchSummary::default();
        let total = archives.len();

        for (done, archive) in archives.iter().enumerate() {
            if let Some(cb) = progress {
                if !cb(done, total) {
                    debug!("Search cancelled at {done}/{total} archives");
                    summary.cancelled = true;
                    break;
                }
            }

            info!(path = %archive.display(), "Searching file");
            match MboxSplitter::open(archive, &self.options) {
                Ok(splitter) => {
                    self.scan_archive(splitter, &compiled, &mut results, &mut summary)
                }
                Err(e) => {
                    warn!(path = %archive.display(), error = %e, "Error opening archive");
                    summary.archives_failed += 1;
                }
            }
        }

        if let Some(cb) = progress {
            if !summary.cancelled {
                let _ = cb(total, total);
            }
        }

        info!(
            matches = results.len(),
            archives = summary.archives_scanned,
            messages = summary.messages_scanned,
            "Search finished"
        );
        Ok((results, summary))
    }

    /// Scan one archive, appending its matches to `results`.
    pub fn scan_archive<R: BufRead>(
        &self,
        mut splitter: MboxSplitter<R>,
        compiled: &CompiledTerms,
        results: &mut ResultsIndex,
        summary: &mut SearchSummary,
    ) {
        let archive = splitter.path().to_path_buf();
        let before = results.len();
        let mut failed = false;

        for item in splitter.by_ref() {
            let raw = match item {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(path = %archive.display(), error = %e, "Error reading archive");
                    failed = true;
                    break;
                }
            };
            summary.messages_scanned += 1;

            let message = match self.decoder.decode(&raw) {
                Ok(message) => message,
                Err(e) => {
                    warn!(
                        path = %archive.display(),
                        ordinal = raw.ordinal,
                        error = %e,
                        "Error processing message"
                    );
                    summary.decode_failures += 1;
                    continue;
                }
            };

            if compiled.matches(&message) {
                self.announce(&archive, raw.ordinal, message.subject());
                results.push(&archive, raw.ordinal, message);
            }
        }

        summary.bytes_read += splitter.bytes_read();
        if failed {
            summary.archives_failed += 1;
        } else {
            summary.archives_scanned += 1;
        }
        info!(
            path = %archive.display(),
            matches = results.len() - before,
            "Finished file"
        );
    }

    fn announce(&self, archive: &Path, ordinal: u64, subject: Option<&str>) {
        info!("{}", format_notice(archive, ordinal, subject));
        if let Some(log) = self.match_log {
            if let Err(e) = log.record(archive, ordinal, subject) {
                warn!(error = %e, "Could not write match log entry");
            }
        }
    }
}
