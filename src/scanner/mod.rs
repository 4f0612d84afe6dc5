//! Scanner module for directory traversal and record collection.
//!
//! # Overview
//!
//! The scanner walks a directory tree and feeds one `(size-key, path)`
//! record per eligible regular file into a
//! [`SortedCollector`](crate::sorter::SortedCollector). The size key is
//! `<length>\<inode>`, so the sorted output clusters files by length and
//! puts hard links on adjacent lines.
//!
//! Submodules:
//! - [`walker`]: depth-first traversal and eligibility filtering
//! - [`inode`]: platform inode identity used to recognize hard links
//!
//! # Example
//!
//! ```no_run
//! use dupescan::scanner::{Walker, WalkerConfig};
//! use dupescan::sorter::SortedCollector;
//! use std::path::Path;
//!
//! let mut collector = SortedCollector::new(std::env::temp_dir());
//! let walker = Walker::new(Path::new("/srv/data"), WalkerConfig::default());
//! let stats = walker.scan_into(&mut collector).unwrap();
//! println!("collected {} files", stats.files);
//! ```

pub mod inode;
pub mod walker;

use serde::Serialize;
use std::io;
use std::path::PathBuf;

pub use inode::{InodeKey, UNKNOWN_IDENTITY};
pub use walker::Walker;

use crate::sorter::SortError;

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links that point to regular files. Links to
    /// directories are never followed.
    pub follow_symlinks: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
        }
    }
}

impl WalkerConfig {
    /// Set whether symlinks to regular files are followed.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

/// Summary of one traversal.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ScanStats {
    /// Records pushed into the collector
    pub files: u64,
    /// Total bytes covered by the pushed records
    pub bytes: u64,
    /// Entries skipped (empty, unreadable, unfollowed links, odd names)
    pub skipped: u64,
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// The starting path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The starting path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while traversing the tree.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The collector failed while storing a record.
    #[error(transparent)]
    Collect(#[from] SortError),
}
