//! Integration tests for level-by-level descendant listings

use super::test_utils::tree;
use vroot::{ChildrenOptions, Descendant, ListingContent, Representation, VirtualFile};

fn three_levels() -> tempfile::TempDir {
    tree(&[
        ("root/top.txt", "t"),
        ("root/first/one.txt", "1"),
        ("root/first/second/two.txt", "2"),
    ])
}

/// Test that offset and limit count directory visits, not entries
#[test]
fn test_offset_one_limit_one_yields_second_level() {
    let temp_dir = three_levels();
    let root = VirtualFile::rooted("/root", temp_dir.path());
    let options = ChildrenOptions {
        recursive: true,
        offset: Some(1),
        limit: Some(1),
        ..ChildrenOptions::default()
    };

    let listings: Vec<_> = root.children(&options).unwrap().collect();

    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].path, "/first");
    let names: Vec<String> = listings[0]
        .content
        .entries()
        .iter()
        .map(|entry| entry.as_str().into_owned())
        .collect();
    assert_eq!(names, vec!["second", "one.txt"]);
}

#[test]
fn test_listing_is_restartable_per_call() {
    let temp_dir = three_levels();
    let root = VirtualFile::rooted("/root", temp_dir.path());
    let options = ChildrenOptions {
        recursive: true,
        ..ChildrenOptions::default()
    };

    let first: Vec<String> = root
        .children(&options)
        .unwrap()
        .map(|listing| listing.path.into_string())
        .collect();
    let second: Vec<String> = root
        .children(&options)
        .unwrap()
        .map(|listing| listing.path.into_string())
        .collect();

    assert_eq!(first, vec!["", "/first", "/first/second"]);
    assert_eq!(first, second);
}

#[test]
fn test_instances_point_at_real_entries() {
    let temp_dir = three_levels();
    let root = VirtualFile::rooted("/root", temp_dir.path());
    let options = ChildrenOptions {
        recursive: true,
        directories: false,
        representation: Representation::Instances,
        ..ChildrenOptions::default()
    };

    let mut files = Vec::new();
    for listing in root.children(&options).unwrap() {
        match listing.content {
            ListingContent::Separate {
                directories: None,
                files: Some(entries),
            } => files.extend(entries),
            other => panic!("unexpected listing {:?}", other),
        }
    }

    let paths: Vec<String> = files
        .iter()
        .map(|entry| match entry {
            Descendant::File(file) => {
                assert!(file.is_file());
                file.path().to_string()
            }
            other => panic!("unexpected entry {:?}", other),
        })
        .collect();
    assert_eq!(
        paths,
        vec!["/root/top.txt", "/root/first/one.txt", "/root/first/second/two.txt"]
    );
}

#[test]
fn test_hidden_patterns_from_config() {
    let temp_dir = tree(&[("d/.env", "secret"), ("d/visible.txt", "v")]);
    let directory = VirtualFile::rooted("/d", temp_dir.path());
    let options = ChildrenOptions {
        hide: true,
        ..directory.config().children_options()
    };

    let listing = directory.children(&options).unwrap().next().unwrap();
    let names: Vec<String> = listing
        .content
        .entries()
        .iter()
        .map(|entry| entry.as_str().into_owned())
        .collect();
    assert_eq!(names, vec!["visible.txt"]);
}

#[test]
fn test_siblings_of_a_file() {
    let temp_dir = three_levels();
    let file = VirtualFile::rooted("/root/first/one.txt", temp_dir.path());
    let options = ChildrenOptions {
        representation: Representation::Paths,
        ..ChildrenOptions::default()
    };

    let listing = file.siblings(&options).unwrap().next().unwrap();
    let names: Vec<String> = listing
        .content
        .entries()
        .iter()
        .map(|entry| entry.as_str().into_owned())
        .collect();
    assert_eq!(names, vec!["/root/first/second", "/root/first/one.txt"]);
}
