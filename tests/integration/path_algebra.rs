//! Integration tests for the separator-aware path algebra

use vroot::{LogicalPath, PathLike, Separator, Side, VirtualFile};

/// Test that a parent marker joined onto a rooted path resolves within it
#[test]
fn test_join_then_normalize_climbs_one_level() {
    let joined = LogicalPath::posix("/abc").join("../xyz");
    assert_eq!(joined, "/abc/../xyz");
    assert_eq!(joined.normalize(), "/xyz");
}

#[test]
fn test_resolve_switch() {
    let path = LogicalPath::posix("123/../abc.md");
    assert_eq!(path.normalize_with(true, false, false), "123/../abc.md");
    assert_eq!(path.normalize_with(true, true, false), "abc.md");
}

#[test]
fn test_transformations_do_not_mutate() {
    let original = LogicalPath::posix("/docs/./guide/../readme.md");
    let normalized = original.normalize();
    let renamed = normalized.with_extension("txt");

    assert_eq!(original, "/docs/./guide/../readme.md");
    assert_eq!(normalized, "/docs/readme.md");
    assert_eq!(renamed, "/docs/readme.txt");
}

#[test]
fn test_dos_style_stays_dos() {
    let path = LogicalPath::new("C:/Users/me/notes.md", Separator::Dos);

    let normalized = path.normalize();
    assert_eq!(normalized, "C:\\Users\\me\\notes.md");
    assert_eq!(normalized.separator(), Separator::Dos);
    assert_eq!(normalized.join("x").separator(), Separator::Dos);
    assert_eq!(normalized.parent(), "C:\\Users\\me");
    assert!(!normalized.as_str().contains('/'));
}

#[test]
fn test_split_shapes() {
    let path = LogicalPath::posix("/a//b/c/");
    assert_eq!(path.split(Some(1)), vec!["/a/b", "c"]);
    assert_eq!(path.split(None), vec!["a", "b", "c"]);
    assert_eq!(LogicalPath::posix("solo").split(Some(1)), vec!["", "solo"]);
}

#[test]
fn test_strip_then_segments() {
    let path = LogicalPath::posix("//srv/data//");
    assert_eq!(path.strip(Side::Both), "srv/data");
    assert_eq!(path.strip(Side::Left).segments(), vec!["srv", "data"]);
}

#[test]
fn test_extension_helpers_chain() {
    let path = LogicalPath::posix("/backups/site.tar.gz");
    assert_eq!(path.name(), "site.tar.gz");
    assert_eq!(path.extension(), ".gz");
    assert_eq!(path.base(), "site.tar");
    assert_eq!(path.base_full().base_full(), "/backups/site");
    assert_eq!(path.with_extension("").with_extension("zip"), "/backups/site.zip");
}

#[test]
fn test_path_like_boundaries() {
    let file = VirtualFile::rooted("/inside/file.txt", "/srv");

    let from_text: PathLike = "/inside/file.txt".into();
    let from_path: PathLike = LogicalPath::posix("/inside/file.txt").into();
    let from_file: PathLike = (&file).into();

    assert_eq!(from_text.as_str(), from_path.as_str());
    assert_eq!(from_file.as_str(), "/inside/file.txt");
}
