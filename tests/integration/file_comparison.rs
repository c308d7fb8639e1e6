//! Integration tests for equality and ordering between virtual files

use super::test_utils::{plant, tree};
use std::cmp::Ordering;
use vroot::{CompareMethod, Comparison, EqualityOptions, VirtualFile};

fn deep() -> EqualityOptions {
    EqualityOptions {
        shallow: false,
        ..EqualityOptions::default()
    }
}

/// Test that a directory outranks a file regardless of size
#[test]
fn test_directory_greater_than_file() {
    let big = "x".repeat(4096);
    let temp_dir = tree(&[("big.bin", big.as_str()), ("small/one.txt", "1")]);
    let file = VirtualFile::rooted("/big.bin", temp_dir.path());
    let directory = VirtualFile::rooted("/small", temp_dir.path());

    assert_eq!(directory.cmp_sizes(&file).unwrap(), Ordering::Greater);
    assert_eq!(file.cmp_sizes(&directory).unwrap(), Ordering::Less);
    assert!(directory > file);
    assert!(file < directory);
}

#[test]
fn test_equality_is_reflexive_and_symmetric() {
    let temp_dir = tree(&[
        ("left/a.txt", "same"),
        ("left/sub/b.txt", "bee"),
        ("right/a.txt", "same"),
        ("right/sub/b.txt", "bee"),
        ("odd/a.txt", "diff"),
        ("odd/sub/b.txt", "bee"),
    ]);
    let left = VirtualFile::rooted("/left", temp_dir.path());
    let right = VirtualFile::rooted("/right", temp_dir.path());
    let odd = VirtualFile::rooted("/odd", temp_dir.path());

    for file in [&left, &right, &odd] {
        assert!(file.equals(file, deep()).unwrap());
    }
    assert!(left.equals(&right, deep()).unwrap());
    assert!(right.equals(&left, deep()).unwrap());
    assert!(!left.equals(&odd, deep()).unwrap());
    assert!(!odd.equals(&left, deep()).unwrap());
    assert!(left.equals(&odd, EqualityOptions { inverse: true, ..deep() }).unwrap());
}

#[test]
fn test_ignored_names_do_not_break_equality() {
    let temp_dir = tree(&[("left/a.txt", "a"), ("right/a.txt", "a")]);
    plant(temp_dir.path(), &[("left/.git/HEAD", "ref"), ("right/__pycache__/", "")]);
    let left = VirtualFile::rooted("/left", temp_dir.path());
    let right = VirtualFile::rooted("/right", temp_dir.path());

    assert_eq!(left, right);
}

#[test]
fn test_extra_entry_breaks_equality() {
    let temp_dir = tree(&[("left/a.txt", "a"), ("right/a.txt", "a"), ("right/b.txt", "b")]);
    let left = VirtualFile::rooted("/left", temp_dir.path());
    let right = VirtualFile::rooted("/right", temp_dir.path());

    assert_ne!(left, right);
    assert_eq!(
        left.compare(&right, CompareMethod::default()).unwrap(),
        Comparison::Equality(false)
    );
}

#[test]
fn test_missing_entries() {
    let temp_dir = tree(&[("a.txt", "a")]);
    let present = VirtualFile::rooted("/a.txt", temp_dir.path());
    let ghost = VirtualFile::rooted("/ghost", temp_dir.path());
    let phantom = VirtualFile::rooted("/phantom", temp_dir.path());

    assert!(ghost.equals(&phantom, EqualityOptions::default()).unwrap());
    assert!(!ghost.equals(&present, EqualityOptions::default()).unwrap());
    assert_eq!(present.cmp_sizes(&ghost).unwrap(), Ordering::Greater);
    assert_eq!(ghost.cmp_counts(&phantom).unwrap(), Ordering::Equal);
}

#[test]
fn test_counts_ordering() {
    let temp_dir = tree(&[("one/a", "a"), ("two/a", "a"), ("two/b", "b")]);
    let one = VirtualFile::rooted("/one", temp_dir.path());
    let two = VirtualFile::rooted("/two", temp_dir.path());

    assert_eq!(
        one.compare(&two, CompareMethod::Counts).unwrap(),
        Comparison::Ordering(Ordering::Less)
    );
}
