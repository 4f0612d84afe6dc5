//! Inode identity used to recognize hard links.
//!
//! Hard links are multiple directory entries pointing to the same inode on
//! disk. Two records carrying the same identity string name the same
//! underlying file object, so the classifier can report them without ever
//! reading content.
//!
//! On Unix the identity is the `(device, inode)` pair from file metadata.
//! Platforms that do not expose one fall back to [`UNKNOWN_IDENTITY`].

use std::fmt;
use std::fs::Metadata;

/// Sentinel identity for filesystems that expose no inode information.
pub const UNKNOWN_IDENTITY: &str = "()";

/// Platform-specific inode key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InodeKey {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
    #[cfg(not(unix))]
    _unsupported: (),
}

impl InodeKey {
    /// Extract an inode key from file metadata.
    ///
    /// Returns `None` when the platform doesn't expose inode identity.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        None
    }

    /// Whether this platform exposes inode identity.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}

impl fmt::Display for InodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(unix)]
        {
            write!(f, "(dev={},ino={})", self.dev, self.ino)
        }
        #[cfg(not(unix))]
        {
            f.write_str(UNKNOWN_IDENTITY)
        }
    }
}

/// Render the identity string for a file, falling back to the sentinel.
#[must_use]
pub fn identity_string(metadata: &Metadata) -> String {
    InodeKey::from_metadata(metadata)
        .map_or_else(|| UNKNOWN_IDENTITY.to_owned(), |key| key.to_string())
}
