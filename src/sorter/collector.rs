//! Sorted collector: bounded in-memory runs merged into one on-disk file.
//!
//! # Overview
//!
//! [`SortedCollector`] is an external-memory sorted multiset of `(key, path)`
//! entries. Pushes land in an ordered in-memory run (`BTreeMap` keyed by the
//! entry key, values keeping insertion order). When the run reaches
//! [`MAX_RUN_SIZE`] entries it is flushed: the first flush writes a fresh
//! sorted temp file, every later flush performs a linear two-way merge of
//! the existing sorted file with the run, producing a replacement file.
//!
//! # Merge tie policy
//!
//! When the next in-memory key compares greater than *or equal to* the next
//! on-disk key, the on-disk line is emitted first. Entries already on disk
//! were pushed before anything still in memory, so on-disk-first on ties is
//! exactly what preserves the temporal order of equal keys across flush
//! boundaries. The classifier depends on this ordering; do not change it.
//!
//! # Lifecycle
//!
//! Created empty, accumulates via [`push`](SortedCollector::push), closed by
//! [`finish`](SortedCollector::finish), after which the sorted file is
//! readable by the caller. The file is not deleted on drop; the driver owns
//! cleanup.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;

use super::{SortError, RECORD_DELIMITER};

/// Maximum number of entries held in memory before a flush.
pub const MAX_RUN_SIZE: usize = 100_000;

/// External-memory sorted collector of `(key, path)` entries.
#[derive(Debug)]
pub struct SortedCollector {
    /// Directory receiving the temporary run files
    temp_dir: PathBuf,
    /// The single live sorted file, once anything has been flushed
    sorted_file: Option<PathBuf>,
    /// In-memory run; values keep insertion order within a key
    run: BTreeMap<String, Vec<String>>,
    /// Number of entries in the run (sum over all keys)
    run_len: usize,
}

impl SortedCollector {
    /// Create an empty collector writing its runs under `temp_dir`.
    #[must_use]
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            sorted_file: None,
            run: BTreeMap::new(),
            run_len: 0,
        }
    }

    /// Push one entry.
    ///
    /// Flushes the in-memory run to disk first if it is full. Entries with
    /// the same key keep the order in which they were pushed.
    pub fn push(&mut self, key: &str, path: &str) -> Result<(), SortError> {
        log::trace!("collecting {} with key {}", path, key);
        if self.run_len >= MAX_RUN_SIZE {
            self.flush()?;
        }
        self.run.entry(key.to_owned()).or_default().push(path.to_owned());
        self.run_len += 1;
        Ok(())
    }

    /// Flush any remaining entries and return the sorted file.
    ///
    /// Returns `None` if nothing was ever pushed (or the only write failed
    /// and was suppressed).
    pub fn finish(&mut self) -> Result<Option<PathBuf>, SortError> {
        log::debug!("finishing collector ({} entries buffered)", self.run_len);
        self.flush()?;
        Ok(self.sorted_file.clone())
    }

    /// The current sorted file, if one exists on disk.
    ///
    /// After [`finish`](Self::finish) this is the complete result.
    #[must_use]
    pub fn sorted_file(&self) -> Option<&Path> {
        self.sorted_file.as_deref()
    }

    /// Flush the in-memory run to disk, merging with the existing sorted
    /// file when there is one.
    fn flush(&mut self) -> Result<(), SortError> {
        if self.run.is_empty() {
            log::debug!("nothing to flush");
            return Ok(());
        }
        let run = std::mem::take(&mut self.run);
        self.run_len = 0;

        match self.sorted_file.take() {
            None => self.write_initial(&run),
            Some(old) => self.merge(old, &run),
        }
    }

    /// First flush: write the run straight into a fresh temp file.
    ///
    /// A failure to create the file propagates; a failure while writing is
    /// suppressed after best-effort deletion, leaving the collector in the
    /// empty state.
    fn write_initial(&mut self, run: &BTreeMap<String, Vec<String>>) -> Result<(), SortError> {
        let (file, path) = self.create_temp_file()?;
        log::debug!("initial sorted run file: {}", path.display());

        if let Err(e) = write_run(BufWriter::new(file), run) {
            log::error!(
                "Cannot write into {}. Make sure there is available space: {}",
                path.display(),
                e
            );
            if let Err(del) = fs::remove_file(&path) {
                log::error!(
                    "Couldn't delete partial file {}, manual cleanup required: {}",
                    path.display(),
                    del
                );
            }
            return Ok(());
        }

        self.sorted_file = Some(path);
        Ok(())
    }

    /// Later flushes: two-way merge of the on-disk file with the run.
    ///
    /// On success the old file is deleted and the new one adopted. On
    /// failure the old file stays bound and intact; the partial new file is
    /// orphaned for the driver to clean up.
    fn merge(&mut self, old: PathBuf, run: &BTreeMap<String, Vec<String>>) -> Result<(), SortError> {
        match self.merge_into_new(&old, run) {
            Ok(new_path) => {
                if let Err(e) = fs::remove_file(&old) {
                    log::warn!(
                        "Couldn't delete superseded run file {}: {}",
                        old.display(),
                        e
                    );
                }
                self.sorted_file = Some(new_path);
                Ok(())
            }
            Err(e) => {
                self.sorted_file = Some(old);
                Err(e)
            }
        }
    }

    fn merge_into_new(
        &self,
        old: &Path,
        run: &BTreeMap<String, Vec<String>>,
    ) -> Result<PathBuf, SortError> {
        let (file, new_path) = self.create_temp_file()?;
        log::debug!(
            "merging {} with in-memory run into {}",
            old.display(),
            new_path.display()
        );

        let reader = BufReader::new(File::open(old).map_err(|source| SortError::Io {
            path: old.to_path_buf(),
            source,
        })?);
        let mut writer = BufWriter::new(file);
        let mut lines = reader.lines();
        let mut entries = run.iter();

        let mut disk_line = read_line(&mut lines, old)?;
        let mut mem_entry = entries.next();

        loop {
            match (disk_line.take(), mem_entry) {
                (None, None) => break,
                (Some(line), None) => {
                    write_line(&mut writer, &line, &new_path)?;
                    disk_line = read_line(&mut lines, old)?;
                }
                (None, Some((key, paths))) => {
                    write_entries(&mut writer, key, paths, &new_path)?;
                    mem_entry = entries.next();
                }
                (Some(line), Some((key, paths))) => {
                    let disk_key = line
                        .split_once(RECORD_DELIMITER)
                        .map_or(line.as_str(), |(k, _)| k);
                    // On ties the on-disk line was pushed earlier and must
                    // come out first.
                    if key.as_str() >= disk_key {
                        write_line(&mut writer, &line, &new_path)?;
                        disk_line = read_line(&mut lines, old)?;
                    } else {
                        write_entries(&mut writer, key, paths, &new_path)?;
                        disk_line = Some(line);
                        mem_entry = entries.next();
                    }
                }
            }
        }

        writer.flush().map_err(|source| SortError::Io {
            path: new_path.clone(),
            source,
        })?;
        Ok(new_path)
    }

    /// Create a persistent temp file in the configured directory.
    ///
    /// The file survives the process; the driver is responsible for removing
    /// it once consumed.
    fn create_temp_file(&self) -> Result<(File, PathBuf), SortError> {
        let named = Builder::new()
            .prefix("sorted-run-")
            .suffix(".tmp")
            .tempfile_in(&self.temp_dir)
            .map_err(|source| SortError::CreateTemp {
                dir: self.temp_dir.clone(),
                source,
            })?;
        named.keep().map_err(|e| SortError::CreateTemp {
            dir: self.temp_dir.clone(),
            source: e.error,
        })
    }
}

/// Write a whole run in ascending key order, flattening each key's paths in
/// insertion order.
fn write_run<W: Write>(mut writer: W, run: &BTreeMap<String, Vec<String>>) -> io::Result<()> {
    for (key, paths) in run {
        for path in paths {
            writeln!(writer, "{key}{RECORD_DELIMITER}{path}")?;
        }
    }
    writer.flush()
}

fn write_line<W: Write>(writer: &mut W, line: &str, path: &Path) -> Result<(), SortError> {
    writeln!(writer, "{line}").map_err(|source| SortError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_entries<W: Write>(
    writer: &mut W,
    key: &str,
    paths: &[String],
    out_path: &Path,
) -> Result<(), SortError> {
    for path in paths {
        writeln!(writer, "{key}{RECORD_DELIMITER}{path}").map_err(|source| SortError::Io {
            path: out_path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn read_line(
    lines: &mut Lines<BufReader<File>>,
    path: &Path,
) -> Result<Option<String>, SortError> {
    lines.next().transpose().map_err(|source| SortError::Io {
        path: path.to_path_buf(),
        source,
    })
}
