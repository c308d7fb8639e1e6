//! Integration tests for zip archives read back with the zip crate

use super::test_utils::tree;
use std::fs::File;
use std::io::Read;
use vroot::checksum::checksum_bytes;
use vroot::{Checksum, CompressOptions, VirtualFile};
use zip::{CompressionMethod, ZipArchive};

fn open(archive: &VirtualFile) -> ZipArchive<File> {
    ZipArchive::new(File::open(archive.full_path()).unwrap()).unwrap()
}

/// Test that stored entries keep their bytes and checksums
#[test]
fn test_stored_archive_matches_sources() {
    let temp_dir = tree(&[
        ("site/index.html", "<h1>hello</h1>"),
        ("site/assets/app.js", "console.log(1);"),
    ]);
    let site = VirtualFile::rooted("/site", temp_dir.path());
    let options = CompressOptions {
        inside: false,
        store: true,
        ..CompressOptions::default()
    };

    let archive = site.compress(&options).unwrap().unwrap();
    assert_eq!(archive.path(), "/site.zip");

    let mut zip = open(&archive);
    assert_eq!(zip.len(), 2);
    for (name, text) in [
        ("index.html", "<h1>hello</h1>"),
        ("assets/app.js", "console.log(1);"),
    ] {
        let entry = zip.by_name(name).unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Stored);
        assert_eq!(entry.size(), text.len() as u64);
        assert_eq!(
            Checksum::Crc32(entry.crc32()),
            checksum_bytes("crc32", text.as_bytes()).unwrap()
        );
    }
}

#[test]
fn test_deflated_archive_reads_back() {
    let text = "repetitive line\n".repeat(200);
    let temp_dir = tree(&[("logs/app.log", text.as_str())]);
    let logs = VirtualFile::rooted("/logs", temp_dir.path());

    let archive = logs.compress(&CompressOptions::default()).unwrap().unwrap();
    let mut zip = open(&archive);
    let mut entry = zip.by_name("app.log").unwrap();

    assert_eq!(entry.compression(), CompressionMethod::Deflated);
    assert!(entry.compressed_size() < entry.size());
    let mut restored = String::new();
    entry.read_to_string(&mut restored).unwrap();
    assert_eq!(restored, text);
}

#[test]
fn test_archive_checksum_matches_entry_crc() {
    let temp_dir = tree(&[("notes.md", "# notes\n")]);
    let notes = VirtualFile::rooted("/notes.md", temp_dir.path());

    let archive = notes.compress(&CompressOptions::default()).unwrap().unwrap();
    assert_eq!(archive.path(), "/notes.zip");

    let mut zip = open(&archive);
    let entry = zip.by_name("notes.md").unwrap();
    assert_eq!(
        Some(Checksum::Crc32(entry.crc32())),
        notes.checksum("crc32").unwrap()
    );
}
