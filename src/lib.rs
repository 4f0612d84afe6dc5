//! dupescan - External-Sort Duplicate File Finder
//!
//! Finds duplicate regular files under a root directory without holding the
//! file inventory in memory. Records stream through external sorted runs: a
//! size/inode pass that reports hard links, an Adler-32 checksum pass for
//! large same-size clusters, and a final byte-by-byte comparison.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod sorter;
