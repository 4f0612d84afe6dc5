//! End-to-end pipeline tests: walk a real directory tree, sort, classify,
//! and check the exact report lines.

use dupescan::duplicates::Classifier;
use dupescan::scanner::{Walker, WalkerConfig};
use dupescan::sorter::SortedCollector;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Run the full pipeline over `root` and return the captured report lines.
fn run_pipeline(root: &Path, config: WalkerConfig) -> Vec<String> {
    let temp = TempDir::new().unwrap();
    let mut collector = SortedCollector::new(temp.path());
    let walker = Walker::new(root, config);
    walker.scan_into(&mut collector).unwrap();

    let Some(sorted) = collector.finish().unwrap() else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut classifier = Classifier::new(&mut out, temp.path());
    classifier.classify(&sorted).unwrap();

    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_owned)
        .collect()
}

fn create_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

#[test]
#[cfg(unix)]
fn hard_links_are_reported_as_such() {
    let dir = TempDir::new().unwrap();
    let a = create_file(dir.path(), "a", b"x");
    let b = dir.path().join("b");
    fs::hard_link(&a, &b).unwrap();

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert_eq!(
        lines,
        vec![format!("Hard Links: {}  =  {}", b.display(), a.display())]
    );
}

#[test]
#[cfg(unix)]
fn hard_link_chain_reports_each_against_the_first() {
    let dir = TempDir::new().unwrap();
    let a = create_file(dir.path(), "a", b"linked");
    let b = dir.path().join("b");
    let c = dir.path().join("c");
    fs::hard_link(&a, &b).unwrap();
    fs::hard_link(&a, &c).unwrap();

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert_eq!(
        lines,
        vec![
            format!("Hard Links: {}  =  {}", b.display(), a.display()),
            format!("Hard Links: {}  =  {}", c.display(), a.display()),
        ]
    );
}

#[test]
fn equal_pair_is_reported_once() {
    let dir = TempDir::new().unwrap();
    let a = create_file(dir.path(), "a", b"abcd");
    let b = create_file(dir.path(), "b", b"abcd");

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert_eq!(
        lines,
        vec![format!("Dup  Files: {}  =  {}", a.display(), b.display())]
    );
}

#[test]
fn same_size_different_content_stays_silent() {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "a", b"abcd");
    create_file(dir.path(), "b", b"abce");

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert!(lines.is_empty(), "unexpected reports: {lines:?}");
}

#[test]
fn cluster_of_four_with_one_duplicate_pair() {
    let dir = TempDir::new().unwrap();
    let a = create_file(dir.path(), "a", b"xxxx");
    create_file(dir.path(), "b", b"yyyy");
    let c = create_file(dir.path(), "c", b"xxxx");
    create_file(dir.path(), "d", b"zzzz");

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert_eq!(
        lines,
        vec![format!("Dup  Files: {}  =  {}", a.display(), c.display())]
    );
}

#[test]
fn three_identical_files_report_against_one_representative() {
    let dir = TempDir::new().unwrap();
    let a = create_file(dir.path(), "a", b"qqqqq");
    let b = create_file(dir.path(), "b", b"qqqqq");
    let c = create_file(dir.path(), "c", b"qqqqq");
    create_file(dir.path(), "d", b"zzzzz");

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert_eq!(
        lines,
        vec![
            format!("Dup  Files: {}  =  {}", a.display(), b.display()),
            format!("Dup  Files: {}  =  {}", a.display(), c.display()),
        ]
    );
}

#[test]
fn checksum_collisions_never_produce_false_reports() {
    let dir = TempDir::new().unwrap();
    // The first two contents share an Adler-32 sum while differing in
    // bytes; the fillers grow the same-length cluster past the checksum
    // threshold so the collision actually reaches the checksum pass.
    create_file(dir.path(), "col1", &[1, 1, 1, 1]);
    create_file(dir.path(), "col2", &[0, 2, 2, 0]);
    create_file(dir.path(), "fill1", b"pqrs");
    create_file(dir.path(), "fill2", b"wxyz");
    create_file(dir.path(), "fill3", b"mnop");

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert!(lines.is_empty(), "unexpected reports: {lines:?}");
}

#[test]
fn large_cluster_duplicates_survive_the_checksum_pass() {
    let dir = TempDir::new().unwrap();
    let a = create_file(dir.path(), "a", b"same");
    create_file(dir.path(), "b", b"left");
    create_file(dir.path(), "c", b"over");
    create_file(dir.path(), "d", b"rest");
    create_file(dir.path(), "e", b"more");
    let f = create_file(dir.path(), "f", b"same");

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert_eq!(
        lines,
        vec![format!("Dup  Files: {}  =  {}", a.display(), f.display())]
    );
}

#[test]
fn empty_and_unreadable_files_are_never_reported() {
    let dir = TempDir::new().unwrap();
    create_file(dir.path(), "empty1", b"");
    create_file(dir.path(), "empty2", b"");
    let locked = create_file(dir.path(), "locked", b"secret-bytes");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    }
    let _ = locked;

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert!(lines.is_empty(), "unexpected reports: {lines:?}");
}

#[test]
#[cfg(unix)]
fn followed_symlink_pairs_with_its_target() {
    let dir = TempDir::new().unwrap();
    let target = create_file(dir.path(), "target", b"pointed-at");
    let alias = dir.path().join("alias");
    std::os::unix::fs::symlink(&target, &alias).unwrap();

    // Following the link resolves to the same inode, so the pair is
    // classified as hard links rather than duplicate content.
    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert_eq!(
        lines,
        vec![format!(
            "Hard Links: {}  =  {}",
            target.display(),
            alias.display()
        )]
    );

    let lines = run_pipeline(
        dir.path(),
        WalkerConfig::default().with_follow_symlinks(false),
    );
    assert!(lines.is_empty());
}

#[test]
fn nested_directories_are_scanned() {
    let dir = TempDir::new().unwrap();
    let deep = dir.path().join("x").join("y");
    fs::create_dir_all(&deep).unwrap();
    let a = create_file(dir.path(), "top", b"nested-dup");
    let b = create_file(&deep, "bottom", b"nested-dup");

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert_eq!(
        lines,
        vec![format!("Dup  Files: {}  =  {}", a.display(), b.display())]
    );
}

#[test]
fn no_pair_is_reported_twice() {
    let dir = TempDir::new().unwrap();
    for i in 0..4 {
        create_file(dir.path(), &format!("copy{i}"), b"heavily duplicated");
    }

    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert_eq!(lines.len(), 3);

    let mut seen = std::collections::HashSet::new();
    for line in &lines {
        let pair = line.strip_prefix("Dup  Files: ").unwrap();
        let (first, second) = pair.split_once("  =  ").unwrap();
        assert_ne!(first, second, "self-pair reported: {line}");
        assert!(seen.insert((first.to_owned(), second.to_owned())));
        assert!(
            !seen.contains(&(second.to_owned(), first.to_owned())) || first == second,
            "pair reported in both orders: {line}"
        );
    }
}

#[test]
fn empty_tree_produces_no_sorted_file() {
    let dir = TempDir::new().unwrap();
    let lines = run_pipeline(dir.path(), WalkerConfig::default());
    assert!(lines.is_empty());
}
