//! Root-jailed virtual files
//!
//! A [`VirtualFile`] binds a POSIX-style logical path to a real root directory. The
//! logical path is normalized to an absolute form on construction, so `..` can never
//! climb above the root, and every filesystem call goes through the frozen full path.
//!
//! Nothing about the filesystem is cached: existence, type and size are queried again
//! on every call.

pub mod compare;
pub mod compress;
pub mod descendants;
pub mod io;
pub mod measure;
pub mod pattern;
pub mod walker;

pub use compare::{CompareMethod, Comparison, EqualityOptions};
pub use compress::CompressOptions;
pub use descendants::{
    Children, ChildrenOptions, Descendant, Listing, ListingContent, Representation,
};
pub use io::{Allowed, Content, NamedStream, Overwrite, ReverseBlocks, ReverseLines, WriteOptions};
pub use measure::{CountOptions, EntryCount, Properties, PropertyRequest, Tally};

use crate::config::FileConfig;
use crate::directory;
use crate::error::FileError;
use crate::path::{LogicalPath, PathLike, Side};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const CURRENT_DIRECTORY: &str = ".";

/// A logical path bound to a real root
#[derive(Clone)]
pub struct VirtualFile {
    root: PathBuf,
    root_path: LogicalPath,
    path: LogicalPath,
    parent_path: LogicalPath,
    name: String,
    full_path: PathBuf,
    full_parent_path: PathBuf,
    config: Arc<FileConfig>,
}

/// Builder for [`VirtualFile`] when the defaults of [`VirtualFile::new`] do not fit
#[derive(Debug, Clone)]
pub struct VirtualFileBuilder {
    path: String,
    root: Option<PathBuf>,
    matching: bool,
    config: Option<Arc<FileConfig>>,
}

impl VirtualFileBuilder {
    /// Real directory beneath the logical path. A leading `~` is expanded; otherwise
    /// it is used as given, only normalized.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Adopt the first existing sibling, alphabetically, whose name starts with the
    /// given name. The path is kept unchanged when nothing matches.
    pub fn matching(mut self, matching: bool) -> Self {
        self.matching = matching;
        self
    }

    pub fn config(mut self, config: FileConfig) -> Self {
        self.config = Some(Arc::new(config));
        self
    }

    /// Resolve the root and freeze the paths.
    ///
    /// Without an explicit root, a path starting with `.` or lacking a leading
    /// separator is rooted at the current working directory, anything else at the
    /// filesystem root. Those default roots are canonicalized.
    pub fn build(self) -> Result<VirtualFile, FileError> {
        let root = match self.root {
            Some(root) => directory::expand_home(&root),
            None => {
                let relative = self.path.starts_with(CURRENT_DIRECTORY)
                    || !LogicalPath::posix(self.path.as_str()).is_rooted();
                let reference = if relative {
                    directory::current()?
                } else {
                    PathBuf::from(std::path::MAIN_SEPARATOR_STR)
                };
                dunce::canonicalize(reference)?
            }
        };

        let config = self.config.unwrap_or_default();
        Ok(VirtualFile::assemble(&self.path, root, self.matching, config))
    }
}

impl VirtualFile {
    /// A file at `path` under the default root
    pub fn new(path: impl Into<PathLike>) -> Result<Self, FileError> {
        match path.into() {
            PathLike::File(file) => Ok(*file),
            other => Self::builder(other.as_str()).build(),
        }
    }

    /// A file at `path` under an explicit `root`
    pub fn rooted(path: impl Into<PathLike>, root: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::assemble(path.as_str(), root.into(), false, Arc::default())
    }

    pub fn builder(path: impl Into<String>) -> VirtualFileBuilder {
        VirtualFileBuilder {
            path: path.into(),
            root: None,
            matching: false,
            config: None,
        }
    }

    fn assemble(path: &str, root: PathBuf, matching: bool, config: Arc<FileConfig>) -> Self {
        // A relative root is anchored at the working directory before `..` is resolved
        let anchored = std::path::absolute(&root).unwrap_or_else(|_| root.clone());
        let root_path = LogicalPath::native(anchored.to_string_lossy().into_owned()).normalize();
        let mut path = LogicalPath::posix(path)
            .strip(Side::Both)
            .normalize_with(true, true, true);

        let (parent, mut name) = path.split_pair();
        let parent_path = if parent.is_empty() {
            LogicalPath::posix("/")
        } else {
            LogicalPath::posix(parent)
        };

        if matching && !name.is_empty() {
            let full_parent = full_of(&root_path, &parent_path);
            if let Some(found) = first_match(&full_parent, &name) {
                path = parent_path.join(&found);
                name = found;
            }
        }

        let full_path = full_of(&root_path, &path);
        let full_parent_path = full_of(&root_path, &parent_path);

        Self {
            root,
            root_path,
            path,
            parent_path,
            name,
            full_path,
            full_parent_path,
            config,
        }
    }

    /// Another file under the same root, sharing this file's configuration
    pub fn instance(&self, path: impl Into<PathLike>) -> Self {
        match path.into() {
            PathLike::File(file) => *file,
            other => Self::assemble(other.as_str(), self.root.clone(), false, self.config.clone()),
        }
    }

    /// The real directory this file is jailed under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The logical path, e.g. `/docs/readme.md`
    pub fn path(&self) -> &str {
        self.path.as_str()
    }

    pub fn logical(&self) -> &LogicalPath {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The logical path of the containing directory; `/` at the top
    pub fn parent_path(&self) -> &str {
        self.parent_path.as_str()
    }

    /// The real path every filesystem call uses
    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    pub fn full_parent_path(&self) -> &Path {
        &self.full_parent_path
    }

    pub fn config(&self) -> &FileConfig {
        &self.config
    }

    pub fn parent(&self) -> Self {
        self.instance(self.parent_path.clone())
    }

    /// Logical path of `name` inside this directory; `None` unless this is a directory
    pub fn child_path(&self, name: &str) -> Option<String> {
        self.is_dir().then(|| self.path.join(name).into_string())
    }

    /// Real path of `name` inside this directory; `None` unless this is a directory
    pub fn child_full_path(&self, name: &str) -> Option<PathBuf> {
        self.child_path(name)
            .map(|child| full_of(&self.root_path, &LogicalPath::posix(child)))
    }

    /// `name` inside this directory; `None` unless this is a directory
    pub fn child(&self, name: &str) -> Option<Self> {
        self.child_path(name).map(|child| self.instance(child))
    }

    /// `name` next to this entry; `None` when this entry does not exist
    pub fn sibling(&self, name: &str) -> Option<Self> {
        self.exists()
            .then(|| self.instance(self.parent_path.join(name)))
    }

    /// This entry when it is a directory, otherwise its parent
    pub(crate) fn bearer(&self) -> Self {
        if self.is_dir() {
            self.clone()
        } else {
            self.parent()
        }
    }

    /// `name` inside [`VirtualFile::bearer`], without checking that it exists
    pub(crate) fn beneath_bearer(&self, name: &str) -> Self {
        let bearer = if self.is_dir() {
            &self.path
        } else {
            &self.parent_path
        };
        self.instance(bearer.join(name))
    }

    /// Real path of a logical path under this file's root
    pub(crate) fn full_of(&self, logical: &LogicalPath) -> PathBuf {
        full_of(&self.root_path, logical)
    }

    /// Remove the entry, recursively for directories. Missing entries are left alone.
    pub fn remove(&self) -> Result<(), FileError> {
        let metadata = match std::fs::symlink_metadata(&self.full_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            std::fs::remove_dir_all(&self.full_path)?;
        } else {
            std::fs::remove_file(&self.full_path)?;
        }

        debug!(path = %self.path, full_path = %self.full_path.display(), "Removed");
        Ok(())
    }

    /// Create missing parent directories
    pub fn plant(&self) -> Result<(), FileError> {
        if !self.full_parent_path.exists() {
            std::fs::create_dir_all(&self.full_parent_path)?;
            debug!(directory = %self.full_parent_path.display(), "Planted parent directories");
        }
        Ok(())
    }
}

fn full_of(root_path: &LogicalPath, logical: &LogicalPath) -> PathBuf {
    PathBuf::from(root_path.join(logical.as_str()).normalize().into_string())
}

fn first_match(directory: &Path, prefix: &str) -> Option<String> {
    let entries = std::fs::read_dir(directory).ok()?;
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names.into_iter().find(|name| name.starts_with(prefix))
}

/// Random lowercase alphanumeric text for nameless destinations
pub(crate) fn salt(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect()
}

impl fmt::Debug for VirtualFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualFile")
            .field("path", &self.path.as_str())
            .field("full_path", &self.full_path)
            .finish()
    }
}

impl fmt::Display for VirtualFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}
