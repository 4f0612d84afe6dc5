//! Streaming Adler-32 checksum of a file.
//!
//! Adler-32 is cheap to compute and selective enough to split same-length
//! clusters before the expensive byte comparison; collisions are filtered
//! out later by that comparison, so nothing here needs to be
//! collision-resistant.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use adler32::RollingAdler32;

/// Read buffer for checksum streaming.
pub const CHECKSUM_BUFFER: usize = 4 * 1024;

/// Errors that can occur while checksumming a file.
#[derive(thiserror::Error, Debug)]
pub enum ChecksumError {
    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Compute the Adler-32 checksum of a file's contents.
///
/// Streams the file through a fixed buffer; a fresh accumulator per call.
pub fn adler32_file(path: &Path) -> Result<u32, ChecksumError> {
    let mut file = File::open(path).map_err(|source| ChecksumError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = RollingAdler32::new();
    let mut buffer = [0u8; CHECKSUM_BUFFER];
    loop {
        let read = file.read(&mut buffer).map_err(|source| ChecksumError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if read == 0 {
            break;
        }
        hasher.update_buffer(&buffer[..read]);
    }
    Ok(hasher.hash())
}
