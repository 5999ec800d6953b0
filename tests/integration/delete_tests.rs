use dupescan::actions::{delete_group, DeleteConfig, DeleteError};
use dupescan::duplicates::{DuplicateFinder, DuplicateGroup, FinderConfig};
use dupescan::scanner::{FileSystem, LocalFs, MemoryFs};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn scan_memory(fs: Arc<MemoryFs>, root: &str) -> Vec<DuplicateGroup> {
    let finder = DuplicateFinder::with_filesystem(FinderConfig::default(), fs);
    finder.find_duplicates(Path::new(root)).unwrap().groups
}

#[test]
fn test_delete_group_on_disk_keeps_first() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/c.txt"), b"hello").unwrap();

    let result = dupescan::scan(dir.path(), true, 1).unwrap();
    let group = &result.groups[0];
    let keep = group.keep().unwrap().path.clone();

    let report = delete_group(&LocalFs::new(), group, &DeleteConfig::default());

    assert!(report.all_succeeded());
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.bytes_freed, 10);
    assert_eq!(report.kept.as_deref(), Some(keep.as_path()));
    assert!(keep.exists());
    assert!(keep.ends_with("a.txt"));
    assert!(!dir.path().join("b.txt").exists());
    assert!(!dir.path().join("sub/c.txt").exists());

    // A rescan finds nothing left to delete
    assert!(dupescan::scan(dir.path(), true, 1).unwrap().groups.is_empty());
}

#[test]
fn test_delete_group_partial_failure() {
    let fs = Arc::new(MemoryFs::new());
    fs.add_file("/r/a", "same");
    fs.add_file("/r/b", "same");
    fs.add_file("/r/c", "same");
    let groups = scan_memory(fs.clone(), "/r");

    fs.remove("/r/b");
    let report = delete_group(fs.as_ref(), &groups[0], &DeleteConfig::default());

    assert_eq!(report.success_count(), 1);
    assert_eq!(report.failure_count(), 1);
    assert!(matches!(&report.failures[0], DeleteError::NotFound(p) if p == Path::new("/r/b")));
    assert!(fs.exists("/r/a"));
    assert!(!fs.exists("/r/c"));
}

#[test]
fn test_delete_group_permission_denied_continues() {
    let fs = Arc::new(MemoryFs::new());
    fs.add_file("/r/1", "xyz");
    fs.add_file("/r/2", "xyz");
    fs.add_file("/r/3", "xyz");
    let groups = scan_memory(fs.clone(), "/r");

    fs.deny_remove("/r/2");
    let report = delete_group(fs.as_ref(), &groups[0], &DeleteConfig::default());

    assert!(matches!(&report.failures[..], [DeleteError::PermissionDenied(_)]));
    assert_eq!(report.deleted.len(), 1);
    assert_eq!(report.deleted[0].path, Path::new("/r/3"));
    assert!(fs.exists("/r/1"));
    assert!(fs.exists("/r/2"));
}

#[test]
fn test_delete_group_skips_modified_file() {
    let fs = Arc::new(MemoryFs::new());
    fs.add_file("/r/a", "12345");
    fs.add_file("/r/b", "12345");
    let groups = scan_memory(fs.clone(), "/r");

    fs.add_file("/r/b", "123456789");
    let report = delete_group(fs.as_ref(), &groups[0], &DeleteConfig::default());

    assert!(matches!(
        &report.failures[..],
        [DeleteError::Modified { expected: 5, actual: 9, .. }]
    ));
    assert!(fs.exists("/r/b"));
}

#[test]
fn test_delete_group_refuses_when_keep_is_gone() {
    let fs = Arc::new(MemoryFs::new());
    fs.add_file("/r/a", "data");
    fs.add_file("/r/b", "data");
    fs.add_file("/r/c", "data");
    let groups = scan_memory(fs.clone(), "/r");

    fs.remove("/r/a");
    let report = delete_group(fs.as_ref(), &groups[0], &DeleteConfig::default());

    assert_eq!(report.success_count(), 0);
    assert_eq!(report.failure_count(), 2);
    assert!(report
        .failures
        .iter()
        .all(|f| matches!(f, DeleteError::KeepMissing { .. })));
    assert!(fs.exists("/r/b"));
    assert!(fs.exists("/r/c"));
}

#[test]
fn test_delete_group_to_trash() {
    let fs = Arc::new(MemoryFs::new());
    fs.add_file("/r/a", "trash me");
    fs.add_file("/r/b", "trash me");
    let groups = scan_memory(fs.clone(), "/r");

    let report = delete_group(fs.as_ref(), &groups[0], &DeleteConfig::trash());

    assert!(report.all_succeeded());
    assert!(!report.deleted[0].permanent);
    assert_eq!(fs.trashed(), vec![Path::new("/r/b").to_path_buf()]);
    assert!(fs.exists("/r/a"));
}

#[test]
fn test_local_fs_is_a_filesystem() {
    fn assert_fs<T: FileSystem>() {}
    assert_fs::<LocalFs>();
    assert_fs::<MemoryFs>();
}
