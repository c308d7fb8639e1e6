//! Structural equality and size/count ordering between virtual files

use super::measure::{CountOptions, Tally};
use super::VirtualFile;
use crate::error::FileError;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::Path;

const COMPARE_BLOCK_SIZE: usize = 8192;

/// Options for [`VirtualFile::equals`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EqualityOptions {
    /// Files with the same size and modification time are taken as equal unread
    pub shallow: bool,
    /// Descend into common subdirectories
    pub recurse: bool,
    /// Report inequality instead
    pub inverse: bool,
}

impl Default for EqualityOptions {
    fn default() -> Self {
        Self {
            shallow: true,
            recurse: true,
            inverse: false,
        }
    }
}

/// How [`VirtualFile::compare`] compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMethod {
    Equality(EqualityOptions),
    /// Order by recursive byte size
    Sizes,
    /// Order by recursive entry count
    Counts,
}

impl Default for CompareMethod {
    fn default() -> Self {
        CompareMethod::Equality(EqualityOptions::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equality(bool),
    Ordering(Ordering),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Directory,
    File,
    Other,
}

impl VirtualFile {
    /// Both refer to the same real path
    pub fn same(&self, other: &VirtualFile) -> bool {
        self.full_path() == other.full_path()
    }

    pub fn compare(&self, other: &VirtualFile, method: CompareMethod) -> Result<Comparison, FileError> {
        match method {
            CompareMethod::Equality(options) => self.equals(other, options).map(Comparison::Equality),
            CompareMethod::Sizes => self.cmp_sizes(other).map(Comparison::Ordering),
            CompareMethod::Counts => self.cmp_counts(other).map(Comparison::Ordering),
        }
    }

    /// Structural equality.
    ///
    /// Two missing entries are equal, a missing and an existing one are not, and a
    /// directory never equals a file. Files compare by content. Directories are equal
    /// when they hold the same names (minus the configured ignore list), every common
    /// name has the same kind on both sides, every common file is equal and, with
    /// `recurse`, every common subdirectory is equal. The walk stops at the first
    /// difference.
    pub fn equals(&self, other: &VirtualFile, options: EqualityOptions) -> Result<bool, FileError> {
        let equal = self.equality(other, options)?;
        Ok(equal != options.inverse)
    }

    fn equality(&self, other: &VirtualFile, options: EqualityOptions) -> Result<bool, FileError> {
        if self.same(other) {
            return Ok(true);
        }

        match (self.exists(), other.exists()) {
            (false, false) => return Ok(true),
            (true, true) => {}
            _ => return Ok(false),
        }

        match (self.is_dir(), other.is_dir()) {
            (true, true) => directories_equal(
                self.full_path(),
                other.full_path(),
                options,
                &self.config().compare_ignore,
            ),
            (false, false) => files_equal(self.full_path(), other.full_path(), options.shallow),
            _ => Ok(false),
        }
    }

    /// Order by recursive byte size
    pub fn cmp_sizes(&self, other: &VirtualFile) -> Result<Ordering, FileError> {
        self.ordering(other, |file| Ok(file.size_total()?.unwrap_or(0)))
    }

    /// Order by recursive entry count
    pub fn cmp_counts(&self, other: &VirtualFile) -> Result<Ordering, FileError> {
        self.ordering(other, |file| {
            let count = file.count(CountOptions::default())?;
            Ok(count
                .and_then(Tally::exact)
                .map(|count| count.total())
                .unwrap_or(0))
        })
    }

    /// The same path or two missing entries are equal. Otherwise an existing entry is
    /// greater than a missing one, a directory greater than a file, and entries of the
    /// same kind compare by `magnitude`.
    fn ordering<F>(&self, other: &VirtualFile, magnitude: F) -> Result<Ordering, FileError>
    where
        F: Fn(&VirtualFile) -> Result<u64, FileError>,
    {
        if self.same(other) {
            return Ok(Ordering::Equal);
        }

        let exists = self.exists();
        let existence = exists.cmp(&other.exists());
        if existence != Ordering::Equal || !exists {
            return Ok(existence);
        }

        let direction = self.is_dir().cmp(&other.is_dir());
        if direction != Ordering::Equal {
            return Ok(direction);
        }

        Ok(magnitude(self)?.cmp(&magnitude(other)?))
    }
}

fn kind_of(path: &Path) -> Kind {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Kind::Directory,
        Ok(metadata) if metadata.is_file() => Kind::File,
        _ => Kind::Other,
    }
}

fn entries(directory: &Path, ignore: &[String]) -> Result<BTreeMap<String, Kind>, FileError> {
    let mut entries = BTreeMap::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if ignore.contains(&name) {
            continue;
        }
        let kind = kind_of(&entry.path());
        entries.insert(name, kind);
    }
    Ok(entries)
}

fn directories_equal(
    left: &Path,
    right: &Path,
    options: EqualityOptions,
    ignore: &[String],
) -> Result<bool, FileError> {
    let left_entries = entries(left, ignore)?;
    let right_entries = entries(right, ignore)?;

    if !left_entries.keys().eq(right_entries.keys()) {
        return Ok(false);
    }

    let mut subdirectories = Vec::new();
    for ((name, left_kind), right_kind) in left_entries.iter().zip(right_entries.values()) {
        match (left_kind, right_kind) {
            (Kind::Directory, Kind::Directory) => subdirectories.push(name),
            (Kind::File, Kind::File) => {
                if !files_equal(&left.join(name), &right.join(name), options.shallow)? {
                    return Ok(false);
                }
            }
            _ => return Ok(false),
        }
    }

    if options.recurse {
        for name in subdirectories {
            if !directories_equal(&left.join(name), &right.join(name), options, ignore)? {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn files_equal(left: &Path, right: &Path, shallow: bool) -> Result<bool, FileError> {
    let left_metadata = fs::metadata(left)?;
    let right_metadata = fs::metadata(right)?;

    if left_metadata.len() != right_metadata.len() {
        return Ok(false);
    }

    if shallow {
        if let (Ok(left_modified), Ok(right_modified)) =
            (left_metadata.modified(), right_metadata.modified())
        {
            if left_modified == right_modified {
                return Ok(true);
            }
        }
    }

    let mut left_reader = BufReader::new(File::open(left)?);
    let mut right_reader = BufReader::new(File::open(right)?);
    let mut left_block = [0u8; COMPARE_BLOCK_SIZE];
    let mut right_block = [0u8; COMPARE_BLOCK_SIZE];

    loop {
        let left_read = fill(&mut left_reader, &mut left_block)?;
        let right_read = fill(&mut right_reader, &mut right_block)?;

        if left_block[..left_read] != right_block[..right_read] {
            return Ok(false);
        }
        if left_read == 0 {
            return Ok(true);
        }
    }
}

/// Read until `buffer` is full or the reader is exhausted
fn fill(reader: &mut impl Read, buffer: &mut [u8]) -> Result<usize, FileError> {
    let mut filled = 0;
    while filled < buffer.len() {
        let read = reader.read(&mut buffer[filled..])?;
        if read == 0 {
            break;
        }
        filled += read;
    }
    Ok(filled)
}

impl PartialEq for VirtualFile {
    /// Shallow, recursive structural equality; I/O failures compare unequal
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, EqualityOptions::default())
            .unwrap_or(false)
    }
}

impl PartialOrd for VirtualFile {
    /// Size ordering. Entries of equal size that are not `==` are unordered, so `<=`
    /// and `>=` need equality too; [`VirtualFile::cmp_sizes`] gives the bare ordering.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.cmp_sizes(other).ok()? {
            Ordering::Equal => (self == other).then_some(Ordering::Equal),
            ordering => Some(ordering),
        }
    }
}
