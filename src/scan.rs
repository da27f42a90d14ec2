//! Discovering mailbox archives under a root directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MboxError, Result};

/// Capability that enumerates the archives to scan.
///
/// The returned order is the discovery order: it fixes the order of search
/// results and decides which archive a bare `--view` ordinal resolves to.
/// It must therefore be the same on every call for an unchanged tree.
pub trait FileLister {
    fn list(&self, root: &Path) -> Result<Vec<PathBuf>>;
}

/// Recursive directory walk selecting files by extension.
///
/// Each directory contributes its own matching files first, then its
/// subdirectories, both sorted by file name. Unreadable subdirectories are
/// logged and skipped. A root that is itself a file is returned as the
/// only archive.
#[derive(Debug, Clone)]
pub struct DirLister {
    extension: String,
    follow_symlinks: bool,
}

impl Default for DirLister {
    fn default() -> Self {
        Self::new("mbox")
    }
}

impl DirLister {
    /// `extension` is given without the leading dot.
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            follow_symlinks: false,
        }
    }

    /// Descend into symlinked directories too.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    fn is_archive_name(&self, name: &str) -> bool {
        name.strip_suffix(self.extension.as_str())
            .is_some_and(|stem| stem.ends_with('.'))
    }

    fn walk(&self, dir: &Path, out: &mut Vec<PathBuf>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Could not read directory");
                return;
            }
        };

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            let (is_dir, is_file) = if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(meta) => (meta.is_dir() && self.follow_symlinks, meta.is_file()),
                    Err(_) => {
                        debug!(path = %path.display(), "Skipping dangling symlink");
                        continue;
                    }
                }
            } else {
                (file_type.is_dir(), file_type.is_file())
            };

            if is_dir {
                subdirs.push(path);
            } else if is_file && self.is_archive_name(&entry.file_name().to_string_lossy()) {
                files.push(path);
            }
        }

        files.sort();
        subdirs.sort();
        out.extend(files);
        for sub in subdirs {
            self.walk(&sub, out);
        }
    }
}

impl FileLister for DirLister {
    fn list(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let meta = fs::metadata(root).map_err(|_| MboxError::InvalidRoot(root.to_path_buf()))?;
        if meta.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let mut archives = Vec::new();
        self.walk(root, &mut archives);
        debug!(root = %root.display(), count = archives.len(), "Discovered archives");
        Ok(archives)
    }
}
