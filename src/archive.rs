//! Archive writing
//!
//! [`ArchiveWriter`] is the narrow capability compression goes through; [`ZipArchiver`]
//! is the zip-backed implementation.

use crate::error::FileError;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// How entries are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Archived as is
    Stored,
    #[default]
    Deflated,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Stored => CompressionMethod::Stored,
            Compression::Deflated => CompressionMethod::Deflated,
        }
    }
}

/// Whether an existing archive is replaced or extended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveMode {
    #[default]
    Create,
    Append,
}

/// A scoped archive writer. Entries land in the order they are added.
pub trait ArchiveWriter {
    /// Copy the file at `source` into the archive under `entry` (`/`-separated)
    fn add_file(&mut self, source: &Path, entry: &str) -> Result<(), FileError>;

    /// Write the central directory and close the archive
    fn finish(self) -> Result<(), FileError>;
}

/// Zip implementation of [`ArchiveWriter`]
pub struct ZipArchiver {
    output: PathBuf,
    writer: ZipWriter<File>,
    compression: Compression,
    entries: usize,
}

impl ZipArchiver {
    /// Open `output` for writing. In [`ArchiveMode::Append`] an existing archive keeps
    /// its entries; a missing one is created.
    pub fn open(
        output: impl Into<PathBuf>,
        mode: ArchiveMode,
        compression: Compression,
    ) -> Result<Self, FileError> {
        let output = output.into();

        let writer = match mode {
            ArchiveMode::Append if output.is_file() => {
                let file = OpenOptions::new().read(true).write(true).open(&output)?;
                ZipWriter::new_append(file)?
            }
            _ => ZipWriter::new(File::create(&output)?),
        };

        debug!(output = %output.display(), ?mode, ?compression, "Opened archive");

        Ok(Self {
            output,
            writer,
            compression,
            entries: 0,
        })
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Entries added through this writer
    pub fn entries(&self) -> usize {
        self.entries
    }
}

impl ArchiveWriter for ZipArchiver {
    fn add_file(&mut self, source: &Path, entry: &str) -> Result<(), FileError> {
        let mut options = FileOptions::default().compression_method(self.compression.method());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(source)?.permissions().mode();
            options = options.unix_permissions(mode);
        }

        self.writer.start_file(entry, options)?;
        let mut reader = File::open(source)?;
        io::copy(&mut reader, &mut self.writer)?;
        self.entries += 1;

        trace!(entry, source = %source.display(), "Archived file");
        Ok(())
    }

    fn finish(mut self) -> Result<(), FileError> {
        self.writer.finish()?;
        debug!(output = %self.output.display(), entries = self.entries, "Closed archive");
        Ok(())
    }
}
