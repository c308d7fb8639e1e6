//! Existence, size, counts, line counts, checksums and property snapshots
//!
//! Queries on a missing entry degrade to `None` (or `false`) instead of failing.
//! Aggregates over a directory skip entries that cannot be read for permission reasons.

use super::walker::{Walker, WalkerConfig};
use super::VirtualFile;
use crate::checksum::{Checksum, Checksummer};
use crate::error::FileError;
use crate::feed::{Feed, Strip};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

/// Result of an aggregate that may stop early at a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tally<T> {
    /// The walk finished; this is the whole amount
    Exact(T),
    /// The walk stopped because the limit was reached; the amount is at least the limit
    LimitReached,
}

impl<T> Tally<T> {
    pub fn exact(self) -> Option<T> {
        match self {
            Tally::Exact(value) => Some(value),
            Tally::LimitReached => None,
        }
    }

    pub fn is_limit_reached(&self) -> bool {
        matches!(self, Tally::LimitReached)
    }
}

/// Entry counts, combined or per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryCount {
    Combined(u64),
    Separate { directories: u64, files: u64 },
}

impl EntryCount {
    pub fn total(&self) -> u64 {
        match self {
            EntryCount::Combined(total) => *total,
            EntryCount::Separate { directories, files } => directories + files,
        }
    }
}

/// Options for [`VirtualFile::count`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountOptions {
    /// Count nested levels, not just immediate entries
    pub recurse: bool,
    /// Report directories and files apart
    pub separate: bool,
    /// Stop once the limited counter reaches this value
    pub limit: Option<u64>,
    /// With `limit_directories`, selects the counter the limit applies to. When both
    /// or neither are set, the limit applies to the combined count.
    pub limit_files: bool,
    pub limit_directories: bool,
}

impl Default for CountOptions {
    fn default() -> Self {
        Self {
            recurse: true,
            separate: false,
            limit: None,
            limit_files: true,
            limit_directories: true,
        }
    }
}

/// Which properties [`VirtualFile::properties`] collects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRequest {
    pub existence: bool,
    pub directory: bool,
    pub file: bool,
    pub empty: bool,
    pub size: bool,
    pub size_recurse: bool,
    pub size_limit: Option<u64>,
    pub count: bool,
    pub count_options: CountOptions,
    /// One checksum per named algorithm
    pub checksums: Vec<String>,
    pub modified: bool,
    pub accessed: bool,
    pub created: bool,
}

impl Default for PropertyRequest {
    fn default() -> Self {
        Self {
            existence: false,
            directory: false,
            file: false,
            empty: false,
            size: false,
            size_recurse: true,
            size_limit: None,
            count: false,
            count_options: CountOptions {
                separate: true,
                ..CountOptions::default()
            },
            checksums: Vec::new(),
            modified: false,
            accessed: false,
            created: false,
        }
    }
}

impl PropertyRequest {
    /// Request every property, checksumming with `algorithm`
    pub fn all(algorithm: &str) -> Self {
        Self {
            existence: true,
            directory: true,
            file: true,
            empty: true,
            size: true,
            count: true,
            checksums: vec![algorithm.to_string()],
            modified: true,
            accessed: true,
            created: true,
            ..Self::default()
        }
    }
}

/// A snapshot of the requested properties. Unrequested or unknown values are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Properties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existence: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Tally<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<Tally<EntryCount>>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub checksums: BTreeMap<String, Checksum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accessed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

fn skippable(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound
    )
}

impl VirtualFile {
    pub fn exists(&self) -> bool {
        self.full_path().exists()
    }

    pub fn is_dir(&self) -> bool {
        self.full_path().is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.full_path().is_file()
    }

    /// A directory is empty when its recursive listing holds no file; a file when it
    /// has no bytes. `None` for a missing entry.
    pub fn is_empty(&self) -> Result<Option<bool>, FileError> {
        if self.is_dir() {
            let holds_file = Walker::new(self.full_path())
                .levels()
                .any(|level| !level.files.is_empty());
            Ok(Some(!holds_file))
        } else if self.is_file() {
            Ok(Some(fs::metadata(self.full_path())?.len() == 0))
        } else {
            Ok(None)
        }
    }

    /// Byte length of a file, or the summed length of the files in a directory.
    ///
    /// With `limit`, a directory walk stops as soon as the running total reaches it
    /// and reports [`Tally::LimitReached`]. A zero limit is no limit. Without `recurse`
    /// only the directory's own files are summed.
    pub fn size(&self, recurse: bool, limit: Option<u64>) -> Result<Option<Tally<u64>>, FileError> {
        if !self.exists() {
            return Ok(None);
        }

        if !self.is_dir() {
            return Ok(Some(Tally::Exact(fs::metadata(self.full_path())?.len())));
        }

        let config = if recurse {
            WalkerConfig::default()
        } else {
            WalkerConfig::shallow()
        };

        let limit = limit.filter(|&limit| limit > 0);
        let mut total: u64 = 0;
        for level in Walker::with_config(self.full_path(), config).levels() {
            for file in level.file_paths() {
                match fs::metadata(&file) {
                    Ok(metadata) => total += metadata.len(),
                    Err(e) if skippable(&e) => {
                        debug!(file = %file.display(), error = %e, "Skipping unsized file");
                    }
                    Err(e) => return Err(e.into()),
                }

                if limit.is_some_and(|limit| total >= limit) {
                    return Ok(Some(Tally::LimitReached));
                }
            }
        }

        Ok(Some(Tally::Exact(total)))
    }

    /// Recursive size without a limit; `None` for a missing entry
    pub fn size_total(&self) -> Result<Option<u64>, FileError> {
        Ok(self.size(true, None)?.and_then(Tally::exact))
    }

    /// Count the entries beneath a directory. A file counts as a single file.
    pub fn count(&self, options: CountOptions) -> Result<Option<Tally<EntryCount>>, FileError> {
        if !self.exists() {
            return Ok(None);
        }

        if !self.is_dir() {
            let count = if options.separate {
                EntryCount::Separate {
                    directories: 0,
                    files: 1,
                }
            } else {
                EntryCount::Combined(1)
            };
            return Ok(Some(Tally::Exact(count)));
        }

        let limit = options.limit.filter(|&limit| limit > 0);
        let combined_limitation = options.limit_files == options.limit_directories;
        let config = if options.recurse {
            WalkerConfig::default()
        } else {
            WalkerConfig::shallow()
        };

        let mut directories: u64 = 0;
        let mut files: u64 = 0;
        let mut reached = false;

        for level in Walker::with_config(self.full_path(), config).levels() {
            directories += level.directories.len() as u64;
            files += level.files.len() as u64;

            if let Some(limit) = limit {
                let limited = if combined_limitation {
                    directories + files
                } else if options.limit_files {
                    files
                } else {
                    directories
                };
                reached = limited >= limit;
            }

            if reached {
                break;
            }
        }

        let count = if reached {
            Tally::LimitReached
        } else if options.separate {
            Tally::Exact(EntryCount::Separate { directories, files })
        } else {
            Tally::Exact(EntryCount::Combined(directories + files))
        };

        Ok(Some(count))
    }

    /// Count the lines of a file through the line-feed pipeline.
    ///
    /// Reaching `limit` reports [`Tally::LimitReached`]. `None` unless this is a file.
    pub fn count_lines(
        &self,
        limit: Option<usize>,
        strip: Strip,
        skip: bool,
    ) -> Result<Option<Tally<usize>>, FileError> {
        if !self.is_file() {
            return Ok(None);
        }

        let reader = BufReader::new(File::open(self.full_path())?);
        let mut failure: Option<io::Error> = None;

        let (length, reached) = {
            let lines = reader.lines().map_while(|line| match line {
                Ok(line) => Some(line),
                Err(e) => {
                    failure = Some(e);
                    None
                }
            });

            let mut length = 0;
            let mut reached = false;
            for _ in Feed::new(lines).strip(strip).skip(skip) {
                length += 1;
                if limit == Some(length) {
                    reached = true;
                    break;
                }
            }
            (length, reached)
        };

        if let Some(e) = failure {
            return Err(e.into());
        }

        if reached {
            Ok(Some(Tally::LimitReached))
        } else {
            Ok(Some(Tally::Exact(length)))
        }
    }

    /// Checksum a file, or every file beneath a directory folded into one digest in
    /// walk order. `None` for a missing entry.
    pub fn checksum(&self, algorithm: &str) -> Result<Option<Checksum>, FileError> {
        if !self.exists() {
            return Ok(None);
        }

        let block_size = self.config().checksum_block_size;
        let mut checksummer = Checksummer::new(algorithm);

        if self.is_dir() {
            for level in Walker::new(self.full_path()).levels() {
                for file in level.file_paths() {
                    match checksum_file(&mut checksummer, &file, block_size) {
                        Err(FileError::Io(e)) if skippable(&e) => {
                            warn!(file = %file.display(), error = %e, "Skipping unreadable file");
                        }
                        result => result?,
                    }
                }
            }
        } else {
            checksum_file(&mut checksummer, self.full_path(), block_size)?;
        }

        checksummer.finalize().map(Some)
    }

    /// Checksum with the configured default algorithm
    pub fn checksum_default(&self) -> Result<Option<Checksum>, FileError> {
        let algorithm = self.config().checksum_algorithm.clone();
        self.checksum(&algorithm)
    }

    /// Collect the requested properties
    pub fn properties(&self, request: &PropertyRequest) -> Result<Properties, FileError> {
        let exists = self.exists();
        let mut properties = Properties::default();

        if request.existence {
            properties.existence = Some(exists);
        }
        if request.directory {
            properties.directory = Some(self.is_dir());
        }
        if request.file {
            properties.file = Some(self.is_file());
        }
        if request.empty {
            properties.empty = self.is_empty()?;
        }
        if request.size {
            properties.size = self.size(request.size_recurse, request.size_limit)?;
        }
        if request.count {
            properties.count = self.count(request.count_options)?;
        }
        for algorithm in request.checksums.iter().filter(|a| !a.is_empty()) {
            if let Some(checksum) = self.checksum(algorithm)? {
                properties.checksums.insert(algorithm.clone(), checksum);
            }
        }

        if exists && (request.modified || request.accessed || request.created) {
            let metadata = fs::metadata(self.full_path())?;
            if request.modified {
                properties.modified = metadata.modified().ok().map(DateTime::<Utc>::from);
            }
            if request.accessed {
                properties.accessed = metadata.accessed().ok().map(DateTime::<Utc>::from);
            }
            if request.created {
                properties.created = metadata.created().ok().map(DateTime::<Utc>::from);
            }
        }

        Ok(properties)
    }
}

fn checksum_file(
    checksummer: &mut Checksummer,
    path: &Path,
    block_size: usize,
) -> Result<(), FileError> {
    let mut file = File::open(path)?;
    let mut buffer = vec![0u8; block_size];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        checksummer.update(&buffer[..read])?;
    }

    Ok(())
}
