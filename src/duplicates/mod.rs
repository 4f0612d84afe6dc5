//! Duplicate detection over sorted record files.
//!
//! # Architecture
//!
//! Classification runs in two passes over two successive sorted files:
//!
//! 1. **Size/inode pass**: consumes the walker's `<length>\<inode>` file.
//!    Adjacent equal keys are hard links and are reported immediately.
//!    Small same-length clusters go straight to byte comparison; once a
//!    cluster crosses the checksum threshold its members are checksummed
//!    and forwarded to a second sorted collector keyed `<adler32>\<length>`.
//!
//! 2. **Checksum pass**: consumes the second sorted file and confirms each
//!    `(checksum, length)` group by byte comparison, so checksum collisions
//!    never produce false reports.
//!
//! Submodules:
//! - [`classifier`]: the two-pass state machine and report emission
//! - [`checksum`]: streaming Adler-32 over a file
//! - [`compare`]: byte-exact comparison of two files

pub mod checksum;
pub mod classifier;
pub mod compare;

pub use checksum::{adler32_file, ChecksumError};
pub use classifier::{Classifier, ClassifyError, MIN_COUNT_CHECKSUM};
pub use compare::compare_contents;
