//! Directory walker feeding size/inode records into a sorted collector.
//!
//! # Overview
//!
//! The walker performs a depth-first traversal of a directory tree (jwalk in
//! serial mode, children sorted for deterministic output) and pushes one
//! `<length>\<inode>:<path>` record per eligible regular file into the
//! collector it is given. The pipeline is single-producer: nothing here
//! spawns threads.
//!
//! Eligibility rules:
//! - directories and non-regular entries are skipped
//! - symlinks to regular files are followed when configured (the default);
//!   symlinks to directories are never followed, which also prevents cycles
//! - empty files are skipped, they cannot be meaningful duplicates
//! - files the process cannot open for reading are skipped
//!
//! Traversal errors (an unreadable directory, for instance) abort the walk;
//! per-file failures are logged and skipped.

use std::fs::{File, Metadata};
use std::path::{Path, PathBuf};

use jwalk::{Parallelism, WalkDir};

use super::inode;
use super::{ScanError, ScanStats, WalkerConfig};
use crate::sorter::{SortedCollector, FIELD_DELIMITER};

/// Directory walker for sequential file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Walk the tree, pushing one size-keyed record per eligible file.
    ///
    /// Paths are pushed verbatim as discovered: absolute iff the root was
    /// given absolute. Returns a traversal summary on success.
    pub fn scan_into(&self, collector: &mut SortedCollector) -> Result<ScanStats, ScanError> {
        if !self.root.exists() {
            return Err(ScanError::NotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        let mut stats = ScanStats::default();

        let walk_dir = WalkDir::new(&self.root)
            .parallelism(Parallelism::Serial)
            .follow_links(false)
            .skip_hidden(false)
            .sort(true);

        for entry_result in walk_dir {
            let entry = entry_result.map_err(|e| {
                let path = e
                    .path()
                    .map_or_else(|| self.root.clone(), Path::to_path_buf);
                log::error!("Couldn't finish walking down the tree at {}: {}", path.display(), e);
                ScanError::Io {
                    path,
                    source: std::io::Error::other(e.to_string()),
                }
            })?;

            let path = entry.path();
            if path == self.root {
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }

            let Some(metadata) = self.resolve_metadata(&path, file_type.is_symlink(), &mut stats)
            else {
                continue;
            };

            // A followed symlink may point at a directory or special file.
            if !metadata.is_file() {
                log::trace!("skipping non-regular entry: {}", path.display());
                continue;
            }

            let len = metadata.len();
            if len == 0 {
                log::debug!("skipping empty file: {}", path.display());
                stats.skipped += 1;
                continue;
            }

            if let Err(e) = File::open(&path) {
                log::debug!("skipping unreadable file {}: {}", path.display(), e);
                stats.skipped += 1;
                continue;
            }

            let name = path.to_string_lossy();
            if name.contains(['\n', '\r']) {
                log::warn!(
                    "skipping file with line separator in its name: {}",
                    path.display()
                );
                stats.skipped += 1;
                continue;
            }

            let identity = inode::identity_string(&metadata);
            let key = format!("{len}{FIELD_DELIMITER}{identity}");
            collector.push(&key, &name)?;
            stats.files += 1;
            stats.bytes += len;
        }

        Ok(stats)
    }

    /// Metadata for an entry, honoring the symlink policy.
    ///
    /// Returns `None` when the entry should be skipped (unfollowed link,
    /// vanished file).
    fn resolve_metadata(
        &self,
        path: &Path,
        is_symlink: bool,
        stats: &mut ScanStats,
    ) -> Option<Metadata> {
        let metadata = if is_symlink {
            if !self.config.follow_symlinks {
                log::trace!("skipping symlink: {}", path.display());
                stats.skipped += 1;
                return None;
            }
            std::fs::metadata(path)
        } else {
            std::fs::symlink_metadata(path)
        };

        match metadata {
            Ok(m) => Some(m),
            Err(e) => {
                log::debug!("skipping {} (metadata unavailable): {}", path.display(), e);
                stats.skipped += 1;
                None
            }
        }
    }
}
