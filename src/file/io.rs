//! Reading, writing, copying and moving
//!
//! Writes create missing parent directories and apply an [`Overwrite`] policy when the
//! destination already exists. Upload-style [`NamedStream`] content is checked against
//! an [`Allowed`] extension list before anything touches the disk.

use super::{salt, VirtualFile};
use crate::error::FileError;
use crate::path::{split_extension, LogicalPath, PathLike, Side};
use std::collections::VecDeque;
use std::fmt;
use std::fs::{self, File, FileTimes, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

const NEWLINE: u8 = b'\n';
const SALT_LENGTH: usize = 4;

/// What to do when a write or copy destination already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overwrite {
    /// Append to the existing file
    Append,
    /// Write under the first free `<base>_<n><ext>` name instead
    #[default]
    Resolve,
    /// Remove the existing entry first
    Replace,
    /// Remove the existing entry and sibling files sharing its base name
    Unique,
    /// Like `Unique`, but sibling directories sharing the base name go too
    UniqueAll,
}

/// Extensions a [`NamedStream`] may carry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Allowed {
    #[default]
    All,
    /// Compared without dots and case-insensitively, e.g. `["png", "jpg"]`
    Extensions(Vec<String>),
}

impl Allowed {
    pub fn permits(&self, extension: &str) -> bool {
        match self {
            Allowed::All => true,
            Allowed::Extensions(extensions) => {
                let bare = extension.trim_start_matches('.').to_lowercase();
                extensions
                    .iter()
                    .any(|allowed| allowed.trim_matches('.').to_lowercase() == bare)
            }
        }
    }
}

/// An incoming stream with the file name its sender gave it
pub struct NamedStream {
    pub name: String,
    pub reader: Box<dyn Read>,
}

impl NamedStream {
    pub fn new(name: impl Into<String>, reader: impl Read + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }
}

impl fmt::Debug for NamedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedStream")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// What [`VirtualFile::write`] writes
pub enum Content {
    /// Touch the file: created when missing, left as is otherwise
    Empty,
    Bytes(Vec<u8>),
    Chunks(Box<dyn Iterator<Item = Vec<u8>>>),
    Reader(Box<dyn Read>),
    Stream(NamedStream),
    /// Create a directory instead of a file
    Directory,
}

impl Content {
    pub fn chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
        I::IntoIter: 'static,
    {
        Content::Chunks(Box::new(chunks.into_iter()))
    }

    pub fn reader(reader: impl Read + 'static) -> Self {
        Content::Reader(Box::new(reader))
    }

    fn is_empty(&self) -> bool {
        match self {
            Content::Empty => true,
            Content::Bytes(bytes) => bytes.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Empty => f.write_str("Empty"),
            Content::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            Content::Chunks(_) => f.write_str("Chunks"),
            Content::Reader(_) => f.write_str("Reader"),
            Content::Stream(stream) => f.debug_tuple("Stream").field(stream).finish(),
            Content::Directory => f.write_str("Directory"),
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Bytes(text.as_bytes().to_vec())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Bytes(text.into_bytes())
    }
}

impl From<&[u8]> for Content {
    fn from(bytes: &[u8]) -> Self {
        Content::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Content {
    fn from(bytes: Vec<u8>) -> Self {
        Content::Bytes(bytes)
    }
}

impl From<NamedStream> for Content {
    fn from(stream: NamedStream) -> Self {
        Content::Stream(stream)
    }
}

/// Options for [`VirtualFile::write`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub overwrite: Overwrite,
    /// Give a stream's extension to a destination name that has none
    pub extend: bool,
    pub allowed: Allowed,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            overwrite: Overwrite::Resolve,
            extend: true,
            allowed: Allowed::All,
        }
    }
}

impl WriteOptions {
    pub fn overwrite(overwrite: Overwrite) -> Self {
        Self {
            overwrite,
            ..Self::default()
        }
    }
}

/// Blocks of a file from its end towards its start
pub struct ReverseBlocks {
    file: File,
    remaining: u64,
    length: usize,
}

impl ReverseBlocks {
    fn open(path: &Path, length: usize) -> io::Result<Self> {
        let file = File::open(path)?;
        let remaining = file.metadata()?.len();
        Ok(Self {
            file,
            remaining,
            length: length.max(1),
        })
    }
}

impl Iterator for ReverseBlocks {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let amount = self.remaining.min(self.length as u64);
        self.remaining -= amount;

        let mut block = vec![0u8; amount as usize];
        let read = self
            .file
            .seek(SeekFrom::Start(self.remaining))
            .and_then(|_| self.file.read_exact(&mut block));

        match read {
            Ok(()) => Some(Ok(block)),
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }
}

/// Lines of a file from the last to the first.
///
/// A single trailing newline does not produce an empty last line; empty lines inside
/// the file are kept.
pub struct ReverseLines {
    blocks: ReverseBlocks,
    carry: Option<Vec<u8>>,
    ready: VecDeque<Vec<u8>>,
    first: bool,
    exhausted: bool,
}

impl ReverseLines {
    fn new(blocks: ReverseBlocks) -> Self {
        Self {
            blocks,
            carry: None,
            ready: VecDeque::new(),
            first: true,
            exhausted: false,
        }
    }
}

fn decode(mut line: Vec<u8>) -> io::Result<String> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

impl Iterator for ReverseLines {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(decode(line));
            }
            if self.exhausted {
                return None;
            }

            match self.blocks.next() {
                Some(Ok(mut block)) => {
                    if self.first {
                        self.first = false;
                        if block.last() == Some(&NEWLINE) {
                            block.pop();
                        }
                    }
                    if let Some(carry) = self.carry.take() {
                        block.extend(carry);
                    }

                    let mut pieces = block.split(|&byte| byte == NEWLINE);
                    self.carry = pieces.next().map(<[u8]>::to_vec);
                    let rest: Vec<Vec<u8>> = pieces.map(<[u8]>::to_vec).collect();
                    self.ready.extend(rest.into_iter().rev());
                }
                Some(Err(e)) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
                None => {
                    self.exhausted = true;
                    self.ready.extend(self.carry.take());
                }
            }
        }
    }
}

impl VirtualFile {
    pub fn read_all(&self) -> Result<Vec<u8>, FileError> {
        Ok(fs::read(self.full_path())?)
    }

    pub fn read_to_string(&self) -> Result<String, FileError> {
        Ok(fs::read_to_string(self.full_path())?)
    }

    /// Consecutive blocks of at most `length` bytes
    pub fn blocks(&self, length: usize) -> Result<impl Iterator<Item = io::Result<Vec<u8>>>, FileError> {
        let mut file = File::open(self.full_path())?;
        let length = length.max(1);

        Ok(std::iter::from_fn(move || {
            let mut block = Vec::with_capacity(length);
            match (&mut file).take(length as u64).read_to_end(&mut block) {
                Ok(0) => None,
                Ok(_) => Some(Ok(block)),
                Err(e) => Some(Err(e)),
            }
        }))
    }

    pub fn lines(&self) -> Result<io::Lines<BufReader<File>>, FileError> {
        Ok(BufReader::new(File::open(self.full_path())?).lines())
    }

    /// Lines from last to first, read in blocks of the configured size
    pub fn read_reverse(&self) -> Result<ReverseLines, FileError> {
        let blocks = ReverseBlocks::open(self.full_path(), self.config().block_size)?;
        Ok(ReverseLines::new(blocks))
    }

    pub fn read_reverse_blocks(&self, length: usize) -> Result<ReverseBlocks, FileError> {
        Ok(ReverseBlocks::open(self.full_path(), length)?)
    }

    /// The first free `<base>_<n><ext>` sibling, `n` counting from 1. An entry that
    /// does not exist resolves to itself. Nothing is created.
    pub fn resolve_conflict(&self) -> Result<VirtualFile, FileError> {
        if !occupied(self.full_path()) {
            return Ok(self.clone());
        }

        let (base, extension) = split_extension(self.name());
        let attempts = self.config().max_conflict_attempts;

        for count in 1..=attempts {
            let proposed = if base.is_empty() {
                format!("{}_{}", self.name(), count)
            } else {
                format!("{}_{}{}", base, count, extension)
            };

            let candidate = self.instance(LogicalPath::posix(self.parent_path()).join(&proposed));
            if !occupied(candidate.full_path()) {
                return Ok(candidate);
            }
        }

        Err(FileError::ConflictExhausted {
            path: self.full_path().to_path_buf(),
            attempts,
        })
    }

    /// Remove siblings that share this entry's base name under another extension.
    /// Sibling directories only go when `directories` is set.
    fn uniquify(&self, directories: bool) -> Result<(), FileError> {
        let (base, extension) = split_extension(self.name());
        if base.is_empty() || !self.full_parent_path().is_dir() {
            return Ok(());
        }

        for entry in fs::read_dir(self.full_parent_path())? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            let (entry_base, entry_extension) = split_extension(&name);

            if entry_base == base && entry_extension != extension {
                let sibling = self.instance(LogicalPath::posix(self.parent_path()).join(&name));
                if directories || sibling.is_file() {
                    sibling.remove()?;
                }
            }
        }

        Ok(())
    }

    /// Apply `overwrite` to an existing destination and return where to write
    fn preoverwrite(&self, overwrite: Overwrite) -> Result<VirtualFile, FileError> {
        if !self.exists() {
            return Ok(self.clone());
        }

        match overwrite {
            Overwrite::Append => Ok(self.clone()),
            Overwrite::Resolve => self.resolve_conflict(),
            Overwrite::Replace => {
                self.remove()?;
                Ok(self.clone())
            }
            Overwrite::Unique | Overwrite::UniqueAll => {
                self.remove()?;
                self.uniquify(overwrite == Overwrite::UniqueAll)?;
                Ok(self.clone())
            }
        }
    }

    /// Pick the destination of a named stream
    fn prewrite(&self, stream: &NamedStream, options: &WriteOptions) -> Result<VirtualFile, FileError> {
        let stream_extension = LogicalPath::posix(stream.name.as_str()).extension();
        if !options.allowed.permits(&stream_extension) {
            return Err(FileError::NotAllowed(stream.name.clone()));
        }

        let mut name = if self.is_dir() || self.name().is_empty() {
            LogicalPath::posix(stream.name.as_str())
                .strip(Side::Both)
                .normalize()
                .simplify()
                .name()
        } else {
            self.name().to_string()
        };

        if name.is_empty() {
            name = salt(SALT_LENGTH);
        }

        if options.extend {
            let trimmed = LogicalPath::posix(name.trim_end_matches('.'));
            if trimmed.extension().is_empty() && stream_extension.len() > 1 {
                name = trimmed.with_extension(&stream_extension).into_string();
            }
        }

        if !self.is_dir() && name == self.name() {
            Ok(self.clone())
        } else {
            Ok(self.beneath_bearer(&name))
        }
    }

    /// Write `content`, returning the entry written or `None` when nothing exists
    /// there afterwards.
    ///
    /// An existing destination is handled per [`WriteOptions::overwrite`], so the
    /// returned entry may sit under a resolved name. Missing parents are created.
    pub fn write(
        &self,
        content: impl Into<Content>,
        options: &WriteOptions,
    ) -> Result<Option<VirtualFile>, FileError> {
        let content = content.into();

        let destination = match &content {
            Content::Stream(stream) => self.prewrite(stream, options)?,
            _ => self.clone(),
        };
        let destination = destination.preoverwrite(options.overwrite)?;

        if let Content::Directory = content {
            fs::create_dir_all(destination.full_path())?;
        } else {
            let append = options.overwrite == Overwrite::Append || content.is_empty();
            destination.plant()?;

            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .append(append)
                .truncate(!append)
                .open(destination.full_path())?;
            let mut writer = BufWriter::with_capacity(self.config().block_size, file);
            drain(content, &mut writer)?;
            writer.flush()?;
        }

        debug!(
            path = %destination.path(),
            full_path = %destination.full_path().display(),
            overwrite = ?options.overwrite,
            "Wrote"
        );

        Ok(destination.exists().then_some(destination))
    }

    /// Copy to `path` under the same root. Directories are copied as trees; files keep
    /// their permissions and access and modification times.
    pub fn copy(
        &self,
        path: impl Into<PathLike>,
        overwrite: Overwrite,
    ) -> Result<Option<VirtualFile>, FileError> {
        if !self.exists() {
            return Ok(None);
        }

        let destination = self.instance(path);
        if destination.same(self) && overwrite != Overwrite::Resolve {
            return Ok(Some(destination));
        }

        destination.plant()?;
        let destination = destination.preoverwrite(overwrite)?;

        if self.is_dir() {
            copy_tree(self.full_path(), destination.full_path())?;
        } else {
            copy_file(self.full_path(), destination.full_path())?;
        }

        debug!(
            from = %self.full_path().display(),
            to = %destination.full_path().display(),
            "Copied"
        );

        Ok(destination.exists().then_some(destination))
    }

    /// Copy, then remove the source. Not an atomic rename; works across devices.
    pub fn move_to(
        &self,
        path: impl Into<PathLike>,
        overwrite: Overwrite,
    ) -> Result<Option<VirtualFile>, FileError> {
        let Some(destination) = self.copy(path, overwrite)? else {
            return Ok(None);
        };

        if !destination.same(self) {
            self.remove()?;
            debug!(
                from = %self.full_path().display(),
                to = %destination.full_path().display(),
                "Moved"
            );
        }

        Ok(Some(destination))
    }
}

/// Taken, including by a dangling link
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn drain(content: Content, writer: &mut impl Write) -> io::Result<()> {
    match content {
        Content::Empty | Content::Directory => Ok(()),
        Content::Bytes(bytes) => writer.write_all(&bytes),
        Content::Chunks(chunks) => {
            for chunk in chunks {
                writer.write_all(&chunk)?;
            }
            Ok(())
        }
        Content::Reader(mut reader) => io::copy(&mut reader, writer).map(|_| ()),
        Content::Stream(mut stream) => io::copy(&mut stream.reader, writer).map(|_| ()),
    }
}

fn copy_file(source: &Path, destination: &Path) -> Result<(), FileError> {
    let metadata = fs::metadata(source)?;
    let mut reader = File::open(source)?;
    let mut writer = File::create(destination)?;
    io::copy(&mut reader, &mut writer)?;

    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    writer.set_times(times)?;
    drop(writer);

    fs::set_permissions(destination, metadata.permissions())?;
    Ok(())
}

fn copy_tree(source: &Path, destination: &Path) -> Result<(), FileError> {
    fs::create_dir_all(destination)?;

    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let from = entry.path();
        let to = destination.join(entry.file_name());

        if from.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            copy_file(&from, &to)?;
        }
    }

    Ok(())
}
