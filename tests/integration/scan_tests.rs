use dupescan::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupescan::scanner::{ScanError, WalkerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(root: &Path, rel: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

fn finder(walker_config: WalkerConfig) -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config))
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let result = dupescan::scan(dir.path(), true, 1).unwrap();

    assert!(result.groups.is_empty());
    assert!(!result.has_duplicates());
    assert_eq!(result.summary.total_files, 0);
    assert_eq!(result.summary.duplicate_groups, 0);
    assert_eq!(result.summary.reclaimable_space, 0);
}

#[test]
fn test_scan_hello_world_scenario() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");
    let root = dir.path().canonicalize().unwrap();

    let result = dupescan::scan(dir.path(), true, 1).unwrap();

    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(
        group.hash_hex(),
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
    assert_eq!(group.size, 5);
    assert_eq!(group.paths(), vec![root.join("a.txt"), root.join("b.txt")]);
    assert_eq!(result.summary.total_files, 3);
    assert_eq!(result.summary.duplicate_files, 1);
    assert_eq!(result.summary.reclaimable_space, 5);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_scan_hello_world_non_recursive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"hello");
    write(dir.path(), "b.txt", b"hello");
    write(dir.path(), "c.txt", b"world");
    write(dir.path(), "sub/d.txt", b"hello");
    let root = dir.path().canonicalize().unwrap();

    let result = dupescan::scan(dir.path(), false, 1).unwrap();

    assert_eq!(result.groups.len(), 1);
    let group = &result.groups[0];
    assert_eq!(
        group.hash_hex(),
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
    );
    assert_eq!(group.paths(), vec![root.join("a.txt"), root.join("b.txt")]);
    assert_eq!(result.summary.total_files, 3);
    assert_eq!(result.summary.reclaimable_space, 5);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    write(dir.path(), "one.bin", b"aaaa");
    write(dir.path(), "two.bin", b"bbbb");

    let result = dupescan::scan(dir.path(), true, 1).unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.summary.hashed_files, 2);
    assert_eq!(result.summary.eliminated_by_size, 0);
}

#[test]
fn test_scan_keep_follows_sorted_traversal() {
    let dir = tempdir().unwrap();
    write(dir.path(), "z.txt", b"same");
    write(dir.path(), "a/deep/x.txt", b"same");
    write(dir.path(), "m.txt", b"same");
    let root = dir.path().canonicalize().unwrap();

    let result = dupescan::scan(dir.path(), true, 1).unwrap();

    assert_eq!(
        result.groups[0].paths(),
        vec![
            root.join("a/deep/x.txt"),
            root.join("m.txt"),
            root.join("z.txt")
        ]
    );
    assert_eq!(result.summary.reclaimable_space, 8);
}

#[test]
fn test_scan_non_recursive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "top.txt", b"dup");
    write(dir.path(), "sub/nested.txt", b"dup");

    let result = dupescan::scan(dir.path(), false, 1).unwrap();
    assert!(result.groups.is_empty());
    assert_eq!(result.summary.total_files, 1);

    let result = dupescan::scan(dir.path(), true, 1).unwrap();
    assert_eq!(result.groups.len(), 1);
}

#[test]
fn test_scan_min_size_boundary() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small1", b"abc");
    write(dir.path(), "small2", b"abc");
    write(dir.path(), "big1", b"abcd");
    write(dir.path(), "big2", b"abcd");

    let result = dupescan::scan(dir.path(), true, 4).unwrap();
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].size, 4);
    assert_eq!(result.summary.total_files, 2);

    let result = dupescan::scan(dir.path(), true, 3).unwrap();
    assert_eq!(result.groups.len(), 2);
}

#[test]
fn test_scan_empty_files_only_with_zero_min_size() {
    let dir = tempdir().unwrap();
    write(dir.path(), "e1", b"");
    write(dir.path(), "e2", b"");

    assert!(dupescan::scan(dir.path(), true, 1).unwrap().groups.is_empty());

    let result = dupescan::scan(dir.path(), true, 0).unwrap();
    assert_eq!(result.groups.len(), 1);
    assert_eq!(
        result.groups[0].hash_hex(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(result.summary.reclaimable_space, 0);
}

#[test]
fn test_scan_hidden_entries() {
    let dir = tempdir().unwrap();
    write(dir.path(), "visible.txt", b"payload");
    write(dir.path(), ".hidden.txt", b"payload");
    write(dir.path(), ".git/objects/blob", b"payload");

    let result = finder(WalkerConfig::default())
        .find_duplicates(dir.path())
        .unwrap();
    assert!(result.groups.is_empty());
    assert_eq!(result.summary.total_files, 1);

    let result = finder(WalkerConfig::default().with_skip_hidden(false))
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 3);
}

#[test]
fn test_scan_invalid_roots() {
    let dir = tempdir().unwrap();
    let file = write(dir.path(), "plain.txt", b"x");

    let err = dupescan::scan(&dir.path().join("missing"), true, 1).unwrap_err();
    assert!(matches!(err, FinderError::InvalidDirectory(_)));

    let err = dupescan::scan(&file, true, 1).unwrap_err();
    assert!(matches!(err, FinderError::InvalidDirectory(_)));
}

#[test]
fn test_scan_is_repeatable() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write(dir.path(), &format!("d{}/f{}.txt", i % 2, i), &[b'x'; 16]);
        write(dir.path(), &format!("u{i}.bin"), format!("unique {i}").as_bytes());
    }

    let first = dupescan::scan(dir.path(), true, 1).unwrap();
    let second = dupescan::scan(dir.path(), true, 1).unwrap();

    assert_eq!(first.groups, second.groups);
    assert_eq!(first.summary.reclaimable_space, 16 * 5);
}

#[cfg(unix)]
#[test]
fn test_scan_skips_symlinks() {
    let dir = tempdir().unwrap();
    let target = write(dir.path(), "real.txt", b"linked");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();
    std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();

    let result = dupescan::scan(dir.path(), true, 1).unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.summary.total_files, 1);
}

#[cfg(unix)]
#[test]
fn test_scan_reports_unreadable_file() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"same");
    write(dir.path(), "b.txt", b"same");
    let locked = write(dir.path(), "c.txt", b"same");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read it anyway
    if fs::read(&locked).is_ok() {
        return;
    }

    let result = dupescan::scan(dir.path(), true, 1).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 2);
    assert_eq!(result.warnings.len(), 1);
    assert!(matches!(result.warnings[0], ScanError::Hash(_)));
    assert!(result.warnings[0].path().ends_with("c.txt"));
}
