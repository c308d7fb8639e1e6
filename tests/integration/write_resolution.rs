//! Integration tests for conflict resolution and overwrite policies

use super::test_utils::tree;
use std::io::Cursor;
use vroot::{Allowed, FileError, NamedStream, Overwrite, VirtualFile, WriteOptions};

/// Test that a resolved name is never one already taken
#[test]
fn test_resolve_conflict_skips_taken_names() {
    let temp_dir = tree(&[("a.txt", "0"), ("a_1.txt", "1"), ("a_3.txt", "3")]);
    let file = VirtualFile::rooted("/a.txt", temp_dir.path());

    let resolved = file.resolve_conflict().unwrap();
    assert_eq!(resolved.path(), "/a_2.txt");
    assert!(!resolved.exists());

    let fresh = VirtualFile::rooted("/b.txt", temp_dir.path());
    assert!(fresh.resolve_conflict().unwrap().same(&fresh));
}

#[test]
fn test_repeated_resolved_writes_never_clobber() {
    let temp_dir = tree(&[]);
    let file = VirtualFile::rooted("/out/data.csv", temp_dir.path());

    let mut written = Vec::new();
    for round in 0..4 {
        let entry = file
            .write(format!("round {}", round), &WriteOptions::default())
            .unwrap()
            .unwrap();
        written.push(entry.path().to_string());
    }

    assert_eq!(
        written,
        vec!["/out/data.csv", "/out/data_1.csv", "/out/data_2.csv", "/out/data_3.csv"]
    );
    assert_eq!(file.read_to_string().unwrap(), "round 0");
}

#[test]
fn test_replace_and_append() {
    let temp_dir = tree(&[("log.txt", "one\n")]);
    let file = VirtualFile::rooted("/log.txt", temp_dir.path());

    file.write("two\n", &WriteOptions::overwrite(Overwrite::Append))
        .unwrap();
    assert_eq!(file.read_to_string().unwrap(), "one\ntwo\n");

    let replaced = file
        .write("fresh", &WriteOptions::overwrite(Overwrite::Replace))
        .unwrap()
        .unwrap();
    assert!(replaced.same(&file));
    assert_eq!(file.read_to_string().unwrap(), "fresh");
}

#[test]
fn test_unique_removes_same_base_siblings() {
    let temp_dir = tree(&[
        ("report.txt", "old"),
        ("report.csv", "csv"),
        ("report.d/", ""),
        ("other.csv", "keep"),
    ]);
    let file = VirtualFile::rooted("/report.txt", temp_dir.path());

    file.write("new", &WriteOptions::overwrite(Overwrite::Unique))
        .unwrap();
    assert_eq!(file.read_to_string().unwrap(), "new");
    assert!(!VirtualFile::rooted("/report.csv", temp_dir.path()).exists());
    assert!(VirtualFile::rooted("/report.d", temp_dir.path()).is_dir());
    assert!(VirtualFile::rooted("/other.csv", temp_dir.path()).exists());

    file.write("newer", &WriteOptions::overwrite(Overwrite::UniqueAll))
        .unwrap();
    assert!(!VirtualFile::rooted("/report.d", temp_dir.path()).exists());
    assert_eq!(file.read_to_string().unwrap(), "newer");
}

#[test]
fn test_stream_into_directory_takes_its_name() {
    let temp_dir = tree(&[("uploads/", "")]);
    let directory = VirtualFile::rooted("/uploads", temp_dir.path());
    let stream = NamedStream::new("../../photo.JPG", Cursor::new(b"jpeg".to_vec()));

    let written = directory
        .write(stream, &WriteOptions::default())
        .unwrap()
        .unwrap();

    assert_eq!(written.path(), "/uploads/photo.JPG");
    assert_eq!(written.read_all().unwrap(), b"jpeg");
}

#[test]
fn test_disallowed_stream_writes_nothing() {
    let temp_dir = tree(&[("uploads/", "")]);
    let directory = VirtualFile::rooted("/uploads", temp_dir.path());
    let stream = NamedStream::new("run.sh", Cursor::new(b"#!/bin/sh".to_vec()));
    let options = WriteOptions {
        allowed: Allowed::Extensions(vec!["png".to_string(), ".jpg".to_string()]),
        ..WriteOptions::default()
    };

    assert!(matches!(
        directory.write(stream, &options),
        Err(FileError::NotAllowed(name)) if name == "run.sh"
    ));
    assert!(!VirtualFile::rooted("/uploads/run.sh", temp_dir.path()).exists());
}

#[test]
fn test_copy_and_move_trees() {
    let temp_dir = tree(&[("src/a.txt", "a"), ("src/nested/b.txt", "b")]);
    let source = VirtualFile::rooted("/src", temp_dir.path());

    let copied = source.copy("/backup/src", Overwrite::Resolve).unwrap().unwrap();
    assert_eq!(copied, source);

    let moved = copied.move_to("/archive", Overwrite::Resolve).unwrap().unwrap();
    assert!(!copied.exists());
    assert!(moved.child("nested").unwrap().child("b.txt").unwrap().is_file());
    assert_eq!(moved, source);
}
