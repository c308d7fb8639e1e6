//! Integration tests for root jailing, measurement and properties

use super::test_utils::tree;
use std::path::Path;
use vroot::{
    Content, CountOptions, EntryCount, FileConfig, PropertyRequest, Strip, Tally, VirtualFile,
    WriteOptions,
};

/// Test that writing a nested path creates its parents and sizes match content
#[test]
fn test_nested_write_then_size() {
    let temp_dir = tree(&[]);
    let file = VirtualFile::rooted("/one/two/three/data.bin", temp_dir.path());
    let content = vec![7u8; 1234];

    let written = file.write(content.clone(), &WriteOptions::default()).unwrap().unwrap();

    assert!(written.exists());
    assert!(written.is_file());
    assert_eq!(written.size(true, None).unwrap(), Some(Tally::Exact(1234)));
    assert_eq!(written.read_all().unwrap(), content);
}

#[test]
fn test_size_matches_read_length() {
    let temp_dir = tree(&[("notes.txt", "some text\nwith lines\n")]);
    let file = VirtualFile::rooted("/notes.txt", temp_dir.path());

    let length = file.read_all().unwrap().len() as u64;
    assert_eq!(file.size_total().unwrap(), Some(length));
}

/// Test that no logical path resolves outside the root
#[test]
fn test_full_paths_stay_under_root() {
    let root = Path::new("/srv/jail");
    for path in ["../../etc/passwd", "/a/../../..", "./x/../../y", "\\..\\..\\z", ""] {
        let file = VirtualFile::rooted(path, root);
        assert!(
            file.full_path().starts_with(root),
            "{} escaped to {}",
            path,
            file.full_path().display()
        );
    }
}

/// Test that `..` in a root walks up from where the root really is
#[test]
fn test_root_parent_markers_are_kept() {
    let file = VirtualFile::rooted("/a", "/srv/x/../data");
    assert_eq!(file.full_path(), Path::new("/srv/data/a"));

    let relative = VirtualFile::rooted("/a", "../data");
    let expected = std::env::current_dir()
        .unwrap()
        .parent()
        .unwrap()
        .join("data")
        .join("a");
    assert_eq!(relative.full_path(), expected.as_path());
    assert!(relative.full_path().is_absolute());
}

#[test]
fn test_instances_share_root_and_config() {
    let temp_dir = tree(&[("a/b.txt", "b")]);
    let config = FileConfig {
        block_size: 4,
        ..FileConfig::default()
    };
    let file = VirtualFile::builder("/a/b.txt")
        .root(temp_dir.path())
        .config(config)
        .build()
        .unwrap();

    let parent = file.parent();
    assert_eq!(parent.root(), file.root());
    assert_eq!(parent.config().block_size, 4);
    assert_eq!(parent.child("b.txt").unwrap().full_path(), file.full_path());
}

#[test]
fn test_directory_measurements() {
    let temp_dir = tree(&[
        ("site/index.html", "<html></html>"),
        ("site/css/style.css", "body{}"),
        ("site/img/", ""),
    ]);
    let site = VirtualFile::rooted("/site", temp_dir.path());

    assert_eq!(site.size_total().unwrap(), Some(19));
    assert_eq!(
        site.count(CountOptions {
            separate: true,
            ..CountOptions::default()
        })
        .unwrap(),
        Some(Tally::Exact(EntryCount::Separate {
            directories: 2,
            files: 2
        }))
    );
    assert_eq!(site.is_empty().unwrap(), Some(false));
    assert_eq!(
        VirtualFile::rooted("/site/img", temp_dir.path())
            .is_empty()
            .unwrap(),
        Some(true)
    );
}

#[test]
fn test_count_lines_with_feed_options() {
    let temp_dir = tree(&[("list.txt", "  a  \n\n b\n   \nc\n")]);
    let file = VirtualFile::rooted("/list.txt", temp_dir.path());

    assert_eq!(
        file.count_lines(None, Strip::Nothing, false).unwrap(),
        Some(Tally::Exact(5))
    );
    assert_eq!(
        file.count_lines(None, Strip::Whitespace, true).unwrap(),
        Some(Tally::Exact(3))
    );
}

#[test]
fn test_properties_default_request_from_config() {
    let temp_dir = tree(&[("a.txt", "abc")]);
    let file = VirtualFile::rooted("/a.txt", temp_dir.path());
    let request = PropertyRequest {
        existence: true,
        size: true,
        ..FileConfig::default().property_request()
    };

    let properties = file.properties(&request).unwrap();
    assert_eq!(properties.existence, Some(true));
    assert_eq!(properties.size, Some(Tally::Exact(3)));
    assert_eq!(properties.checksums.len(), 1);
    assert!(properties.checksums.contains_key("crc32"));
}

#[test]
fn test_reverse_reading_of_log() {
    let temp_dir = tree(&[]);
    let log = VirtualFile::rooted("/app.log", temp_dir.path());
    log.write("start\nwork\n", &WriteOptions::default()).unwrap();
    log.write(
        Content::from("stop\n"),
        &WriteOptions::overwrite(vroot::Overwrite::Append),
    )
    .unwrap();

    let lines: Vec<String> = log.read_reverse().unwrap().map(|l| l.unwrap()).collect();
    assert_eq!(lines, vec!["stop", "work", "start"]);
}
