//! Byte-exact comparison of two files.
//!
//! `Equal` means both files exist and their contents are byte-identical;
//! that is the only value callers may rely on. The non-equal orderings
//! carry a sign (missing file, shorter file, first differing byte) but an
//! I/O failure also maps to `Less`, so the sign must never be treated as
//! ordering-significant.

use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Read buffer for content comparison.
pub const COMPARE_BUFFER: usize = 8 * 1024;

/// Compare the contents of two files.
///
/// - `first` missing → `Less`; `second` missing → `Greater`
/// - differing lengths → the ordering of the lengths
/// - otherwise the ordering of the first differing byte, or `Equal` when
///   both streams end together without one
/// - an I/O error while reading is logged and reported as `Less`
#[must_use]
pub fn compare_contents(first: &Path, second: &Path) -> Ordering {
    let Ok(meta1) = fs::metadata(first) else {
        return Ordering::Less;
    };
    let Ok(meta2) = fs::metadata(second) else {
        return Ordering::Greater;
    };

    match meta1.len().cmp(&meta2.len()) {
        Ordering::Equal => {}
        other => return other,
    }

    match compare_streams(first, second) {
        Ok(ordering) => ordering,
        Err(e) => {
            log::error!(
                "Couldn't compare files {} and {}: {}",
                first.display(),
                second.display(),
                e
            );
            Ordering::Less
        }
    }
}

fn compare_streams(first: &Path, second: &Path) -> io::Result<Ordering> {
    let mut reader1 = BufReader::with_capacity(COMPARE_BUFFER, File::open(first)?);
    let mut reader2 = BufReader::with_capacity(COMPARE_BUFFER, File::open(second)?);

    loop {
        let (consumed, ordering) = {
            let buf1 = reader1.fill_buf()?;
            let buf2 = reader2.fill_buf()?;
            if buf1.is_empty() && buf2.is_empty() {
                return Ok(Ordering::Equal);
            }
            if buf1.is_empty() {
                return Ok(Ordering::Less);
            }
            if buf2.is_empty() {
                return Ok(Ordering::Greater);
            }
            let common = buf1.len().min(buf2.len());
            (common, buf1[..common].cmp(&buf2[..common]))
        };

        if ordering != Ordering::Equal {
            return Ok(ordering);
        }
        reader1.consume(consumed);
        reader2.consume(consumed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_file(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap().write_all(content).unwrap();
        path
    }

    #[test]
    fn test_identical_files_are_equal() {
        let dir = TempDir::new().unwrap();
        let a = create_file(&dir, "a", b"same content");
        let b = create_file(&dir, "b", b"same content");
        assert_eq!(compare_contents(&a, &b), Ordering::Equal);
        assert_eq!(compare_contents(&b, &a), Ordering::Equal);
    }

    #[test]
    fn test_first_differing_byte_decides() {
        let dir = TempDir::new().unwrap();
        let a = create_file(&dir, "a", b"abcd");
        let b = create_file(&dir, "b", b"abce");
        assert_eq!(compare_contents(&a, &b), Ordering::Less);
        assert_eq!(compare_contents(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_length_mismatch_decides_without_reading() {
        let dir = TempDir::new().unwrap();
        let short = create_file(&dir, "short", b"ab");
        let long = create_file(&dir, "long", b"abc");
        assert_eq!(compare_contents(&short, &long), Ordering::Less);
        assert_eq!(compare_contents(&long, &short), Ordering::Greater);
    }

    #[test]
    fn test_missing_files() {
        let dir = TempDir::new().unwrap();
        let present = create_file(&dir, "present", b"x");
        let missing = dir.path().join("missing");
        assert_eq!(compare_contents(&missing, &present), Ordering::Less);
        assert_eq!(compare_contents(&present, &missing), Ordering::Greater);
        assert_eq!(compare_contents(&missing, &missing), Ordering::Less);
    }

    #[test]
    fn test_difference_beyond_first_buffer() {
        let dir = TempDir::new().unwrap();
        let mut base = vec![b'x'; COMPARE_BUFFER + 100];
        let a = create_file(&dir, "a", &base);
        base[COMPARE_BUFFER + 50] = b'y';
        let b = create_file(&dir, "b", &base);
        assert_eq!(compare_contents(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_large_identical_files() {
        let dir = TempDir::new().unwrap();
        let content = vec![b'z'; COMPARE_BUFFER * 2 + 7];
        let a = create_file(&dir, "a", &content);
        let b = create_file(&dir, "b", &content);
        assert_eq!(compare_contents(&a, &b), Ordering::Equal);
    }
}
