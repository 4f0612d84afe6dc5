//! Two-pass duplicate classifier over sorted record files.
//!
//! # Overview
//!
//! Pass one reads the walker's `<length>\<inode>` file. Lines with the same
//! full key are hard links and are reported on sight. Within a same-length
//! cluster the classifier keeps a small list of candidate paths; when the
//! cluster ends the candidates are cross-compared byte-for-byte. A cluster
//! that crosses [`MIN_COUNT_CHECKSUM`] instead has its members checksummed
//! and forwarded into a second sorted collector keyed `<adler32>\<length>`.
//!
//! Pass two reads that collector's output. Each `(checksum, length)` group
//! is confirmed by byte comparison: an incoming group member is compared
//! against the group's representatives on the spot, and whatever remains
//! unmatched is cross-compared when the group closes.
//!
//! Both passes flush their final cluster/group at end of input.
//!
//! # Reporting
//!
//! Reports go to the injected sink, one line per pair:
//!
//! ```text
//! Hard Links: <path1>  =  <path2>
//! Dup  Files: <path1>  =  <path2>
//! ```
//!
//! The earlier-seen path of a pair is always on the left, and no pair is
//! ever reported twice: a path that matched a representative is dropped
//! from its cluster once reported.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::checksum;
use super::compare::compare_contents;
use crate::sorter::{SortError, SortedCollector, FIELD_DELIMITER, RECORD_DELIMITER};

/// Cluster size at which checksum filtering takes over from direct byte
/// comparison. Below it, comparing a handful of files directly is cheaper
/// than a full checksum pass over each.
pub const MIN_COUNT_CHECKSUM: usize = 3;

/// Errors that can occur during classification.
#[derive(thiserror::Error, Debug)]
pub enum ClassifyError {
    /// A sorted input file could not be read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The report sink rejected a write.
    #[error("Cannot write duplicate report: {0}")]
    Report(#[source] io::Error),

    /// The checksum collector failed.
    #[error(transparent)]
    Sort(#[from] SortError),
}

/// Two-pass duplicate classifier.
///
/// Owns the report sink; the temp directory is used for the intermediate
/// checksum-keyed collector.
#[derive(Debug)]
pub struct Classifier<W: Write> {
    out: W,
    temp_dir: PathBuf,
}

impl<W: Write> Classifier<W> {
    /// Create a classifier writing reports to `out`.
    #[must_use]
    pub fn new(out: W, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            out,
            temp_dir: temp_dir.into(),
        }
    }

    /// Run both passes over the size-keyed sorted file.
    ///
    /// Returns the checksum-keyed sorted file when one was produced, so the
    /// caller can clean it up alongside the input.
    pub fn classify(&mut self, sorted_by_size: &Path) -> Result<Option<PathBuf>, ClassifyError> {
        let mut checksums = SortedCollector::new(&self.temp_dir);
        self.scan_by_size(sorted_by_size, &mut checksums)?;

        let checksum_file = checksums.finish()?;
        if let Some(path) = &checksum_file {
            self.scan_by_checksum(path)?;
        }
        Ok(checksum_file)
    }

    /// Pass one: hard links, small-cluster byte comparison, checksum
    /// forwarding for large clusters.
    fn scan_by_size(
        &mut self,
        sorted: &Path,
        checksums: &mut SortedCollector,
    ) -> Result<(), ClassifyError> {
        log::debug!("reading size-keyed records from {}", sorted.display());

        let mut prev_key: Option<String> = None;
        let mut prev_name = String::new();
        let mut prev_len: Option<String> = None;
        let mut group: Vec<Option<String>> = Vec::new();
        let mut group_count = 0usize;

        for line in open_sorted(sorted)?.lines() {
            let line = line.map_err(|source| ClassifyError::Io {
                path: sorted.to_path_buf(),
                source,
            })?;
            let Some((key, name)) = line.split_once(RECORD_DELIMITER) else {
                log::warn!("malformed record in {}: {}", sorted.display(), line);
                continue;
            };

            // Same full key: same length and same inode, a hard link of the
            // previous file. Nothing else to track, the two are equivalent.
            if prev_key.as_deref() == Some(key) {
                self.report_hard_link(name, &prev_name)?;
                continue;
            }

            let Some((len, _identity)) = key.split_once(FIELD_DELIMITER) else {
                log::warn!("malformed key in {}: {}", sorted.display(), key);
                continue;
            };

            if prev_len.as_deref() == Some(len) {
                match group_count.cmp(&MIN_COUNT_CHECKSUM) {
                    Ordering::Less => {
                        group.push(Some(name.to_owned()));
                    }
                    Ordering::Equal => {
                        // The cluster just crossed the threshold: checksum
                        // everything gathered so far plus this file.
                        group.push(Some(name.to_owned()));
                        for member in group.drain(..).flatten() {
                            push_checksum(&member, len, checksums)?;
                        }
                    }
                    Ordering::Greater => {
                        push_checksum(name, len, checksums)?;
                    }
                }
                group_count += 1;
                prev_key = Some(key.to_owned());
                prev_name = name.to_owned();
            } else {
                self.close_group(&mut group)?;
                group.push(Some(name.to_owned()));
                group_count = 0;
                prev_len = Some(len.to_owned());
                prev_key = Some(key.to_owned());
                prev_name = name.to_owned();
            }
        }

        // The last cluster has no successor line to close it.
        self.close_group(&mut group)
    }

    /// Pass two: confirm each `(checksum, length)` group by byte comparison.
    fn scan_by_checksum(&mut self, sorted: &Path) -> Result<(), ClassifyError> {
        log::debug!("reading checksum-keyed records from {}", sorted.display());

        let mut prev_key: Option<String> = None;
        let mut group: Vec<Option<String>> = Vec::new();

        for line in open_sorted(sorted)?.lines() {
            let line = line.map_err(|source| ClassifyError::Io {
                path: sorted.to_path_buf(),
                source,
            })?;
            let Some((key, name)) = line.split_once(RECORD_DELIMITER) else {
                log::warn!("malformed record in {}: {}", sorted.display(), line);
                continue;
            };

            if prev_key.as_deref() == Some(key) {
                // Compare against the group's representatives on the spot;
                // a match means this file needs no slot of its own.
                let mut matched = false;
                for member in group.iter().flatten() {
                    if compare_contents(Path::new(member), Path::new(name)) == Ordering::Equal {
                        self.report_duplicate(member, name)?;
                        matched = true;
                        break;
                    }
                }
                if !matched {
                    group.push(Some(name.to_owned()));
                }
                continue;
            }

            self.close_group(&mut group)?;
            group.push(Some(name.to_owned()));
            prev_key = Some(key.to_owned());
        }

        self.close_group(&mut group)
    }

    /// Cross-compare the remaining members of a closing cluster and report
    /// every equal pair once.
    ///
    /// The lower-indexed path stays alive as the representative; a matched
    /// member is nulled out so it cannot be re-reported against a later
    /// representative. Clears the list.
    fn close_group(&mut self, group: &mut Vec<Option<String>>) -> Result<(), ClassifyError> {
        for i in 0..group.len() {
            let Some(first) = group[i].clone() else {
                continue;
            };
            for j in (i + 1)..group.len() {
                let Some(second) = group[j].clone() else {
                    continue;
                };
                if compare_contents(Path::new(&first), Path::new(&second)) == Ordering::Equal {
                    self.report_duplicate(&first, &second)?;
                    group[j] = None;
                }
            }
        }
        group.clear();
        Ok(())
    }

    fn report_hard_link(&mut self, name: &str, prev: &str) -> Result<(), ClassifyError> {
        log::debug!("hard links: {} = {}", name, prev);
        writeln!(self.out, "Hard Links: {name}  =  {prev}").map_err(ClassifyError::Report)
    }

    fn report_duplicate(&mut self, first: &str, second: &str) -> Result<(), ClassifyError> {
        log::debug!("duplicate content: {} = {}", first, second);
        writeln!(self.out, "Dup  Files: {first}  =  {second}").map_err(ClassifyError::Report)
    }
}

/// Checksum one file and forward it keyed `<adler32>\<length>`.
///
/// A file whose checksum fails is logged and left out of the checksum pass;
/// the scan itself continues.
fn push_checksum(
    name: &str,
    len: &str,
    checksums: &mut SortedCollector,
) -> Result<(), ClassifyError> {
    match checksum::adler32_file(Path::new(name)) {
        Ok(sum) => {
            let key = format!("{sum}{FIELD_DELIMITER}{len}");
            checksums.push(&key, name).map_err(ClassifyError::from)
        }
        Err(e) => {
            log::warn!("excluding {} from checksum pass: {}", name, e);
            Ok(())
        }
    }
}

fn open_sorted(path: &Path) -> Result<BufReader<File>, ClassifyError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ClassifyError::Io {
            path: path.to_path_buf(),
            source,
        })
}
