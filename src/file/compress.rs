//! Zip archives of directories and single files

use super::walker::Walker;
use super::{salt, VirtualFile};
use crate::archive::{ArchiveMode, ArchiveWriter, Compression, ZipArchiver};
use crate::error::FileError;
use crate::path::{LogicalPath, Side};
use std::io;
use std::path::Path;
use tracing::{debug, trace};

const ARCHIVE_EXTENSION: &str = ".zip";

/// Options for [`VirtualFile::compress`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressOptions {
    /// Archive file name; derived from the archived entry when absent
    pub name: Option<String>,
    /// Place the archive inside the archived directory instead of next to it
    pub inside: bool,
    /// Archive without compressing
    pub store: bool,
    /// Paths relative to the archived directory
    pub files: Vec<String>,
    /// `files` lists what to archive when set, what to leave out otherwise
    pub include: bool,
    /// Add to an existing archive instead of replacing it
    pub append: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            name: None,
            inside: true,
            store: false,
            files: Vec::new(),
            include: true,
            append: false,
        }
    }
}

impl VirtualFile {
    /// Archive this directory, or this file alone, into a zip.
    ///
    /// A directory archive goes inside the directory (`.zip` by default) or next to it
    /// (`<name>.zip`). A file archive always goes next to the file as `<base>.zip`. The
    /// archive never contains itself. `None` for a missing entry.
    pub fn compress(&self, options: &CompressOptions) -> Result<Option<VirtualFile>, FileError> {
        if !self.exists() {
            return Ok(None);
        }

        let is_directory = self.is_dir();
        let bearer = self.bearer();
        let (files, include, inside) = if is_directory {
            (options.files.clone(), options.include, options.inside)
        } else {
            (vec![self.name().to_string()], true, false)
        };

        let name = match options.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.archive_name(inside),
        };

        let archive = if inside {
            bearer.instance(bearer.logical().join(&name))
        } else {
            self.instance(LogicalPath::posix(self.parent_path()).join(&name))
        };
        archive.plant()?;

        let mode = if options.append {
            ArchiveMode::Append
        } else {
            ArchiveMode::Create
        };
        let compression = if options.store {
            Compression::Stored
        } else {
            Compression::Deflated
        };

        let output = archive.full_path().to_path_buf();
        let mut archiver = ZipArchiver::open(&output, mode, compression)?;

        if include && !files.is_empty() {
            for file in &files {
                let entry = entry_of(file);
                let member = bearer.instance(bearer.logical().join(&entry));

                if member.is_dir() {
                    archive_tree(&mut archiver, member.full_path(), &entry, &output, &[])?;
                } else if member.is_file() {
                    archiver.add_file(member.full_path(), &entry)?;
                } else {
                    return Err(io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("nothing to archive at {}", member.path()),
                    )
                    .into());
                }
            }
        } else {
            let excludes: Vec<Vec<String>> = if include {
                Vec::new()
            } else {
                files
                    .iter()
                    .map(|file| LogicalPath::posix(entry_of(file)).segments())
                    .collect()
            };
            archive_tree(&mut archiver, bearer.full_path(), "", &output, &excludes)?;
        }

        let entries = archiver.entries();
        archiver.finish()?;

        debug!(
            source = %self.path(),
            archive = %archive.path(),
            entries,
            "Compressed"
        );

        Ok(archive.exists().then_some(archive))
    }

    /// A directory as an archive, anything else as itself
    pub fn singular(&self, options: &CompressOptions) -> Result<Option<VirtualFile>, FileError> {
        if self.is_dir() {
            self.compress(options)
        } else {
            Ok(Some(self.clone()))
        }
    }

    fn archive_name(&self, inside: bool) -> String {
        if inside {
            return ARCHIVE_EXTENSION.to_string();
        }

        let stem = if self.is_dir() {
            self.name().to_string()
        } else {
            match LogicalPath::posix(self.name()).base() {
                base if base.is_empty() => self.name().to_string(),
                base => base,
            }
        };

        if stem.is_empty() {
            format!("{}{}", salt(4), ARCHIVE_EXTENSION)
        } else {
            format!("{}{}", stem, ARCHIVE_EXTENSION)
        }
    }
}

/// `/`-joined relative entry name without leading or trailing separators
fn entry_of(path: &str) -> String {
    LogicalPath::posix(path)
        .normalize_with(true, true, false)
        .strip(Side::Both)
        .into_string()
}

fn archive_tree(
    archiver: &mut impl ArchiveWriter,
    directory: &Path,
    prefix: &str,
    output: &Path,
    excludes: &[Vec<String>],
) -> Result<(), FileError> {
    for level in Walker::new(directory).levels() {
        for name in &level.files {
            let source = level.directory.join(name);
            if source == output {
                trace!(archive = %output.display(), "Skipping the archive itself");
                continue;
            }
            if !source.is_file() {
                continue;
            }

            let entry = LogicalPath::posix(prefix)
                .join(level.relative.as_str())
                .join(name)
                .strip(Side::Left);

            if excludes.contains(&entry.segments()) {
                continue;
            }

            archiver.add_file(&source, entry.as_str())?;
        }
    }

    Ok(())
}
