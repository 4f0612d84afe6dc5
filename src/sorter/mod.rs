//! External-memory sorting of keyed file records.
//!
//! # Overview
//!
//! The sorter accumulates `(key, path)` entries in a bounded in-memory run
//! and maintains a single on-disk sorted file by merging each flushed run
//! into it. This keeps memory constant no matter how many files are pushed,
//! which is what allows the pipeline to handle populations that exceed main
//! memory.
//!
//! # Sorted file format
//!
//! UTF-8 text, one record per line, of the form `key:path`, globally sorted
//! by `key` ascending using code-unit comparison. Keys are opaque to the
//! sorter except for the record delimiter; the pipeline composes them from
//! fields joined by [`FIELD_DELIMITER`] (`<length>\<inode>` on the first
//! pass, `<adler32>\<length>` on the second).
//!
//! Ties between paths with the same key keep the order in which they were
//! pushed, including across flush boundaries. See
//! [`SortedCollector`](collector::SortedCollector) for the merge contract
//! that guarantees this.

pub mod collector;

pub use collector::{SortedCollector, MAX_RUN_SIZE};

use std::io;
use std::path::PathBuf;

/// Separator between fields inside a key (`<length>\<inode>`).
pub const FIELD_DELIMITER: char = '\\';

/// Separator between the key and the path on each sorted-file line.
pub const RECORD_DELIMITER: char = ':';

/// Errors that can occur while collecting and sorting records.
#[derive(thiserror::Error, Debug)]
pub enum SortError {
    /// A temporary run file could not be created.
    #[error("Cannot create temp file in {dir}: {source}")]
    CreateTemp {
        /// The configured temp directory
        dir: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// An I/O error occurred while reading or writing a run file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}
