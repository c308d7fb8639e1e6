//! Filesystem walker yielding one record per directory visited
//!
//! The walk is pre-order and lazy: a directory is only listed when its level is
//! requested. Entries inside a level are sorted by file name, and subdirectories are
//! visited in that same order, so walks are deterministic.

use crate::path::LogicalPath;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use walkdir::WalkDir;

/// One directory level of a walk
#[derive(Debug, Clone)]
pub struct Level {
    /// Real path of the directory listed
    pub directory: PathBuf,
    /// Path of the directory relative to the walk root: `""` for the root itself,
    /// otherwise rooted and `/`-separated, as in `/a/b`
    pub relative: LogicalPath,
    /// Names of subdirectories, including links to directories
    pub directories: Vec<String>,
    /// Names of everything else
    pub files: Vec<String>,
    /// Distance from the walk root
    pub depth: usize,
}

impl Level {
    /// Real paths of the files in this level
    pub fn file_paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.files.iter().map(|name| self.directory.join(name))
    }
}

/// Walker configuration
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Whether to descend into symbolic links to directories (default: false)
    pub follow_symlinks: bool,
    /// Deepest level to descend to; `Some(0)` lists the root only (None = unlimited)
    pub max_depth: Option<usize>,
}

impl WalkerConfig {
    /// Configuration for a walk that stops after the root level
    pub fn shallow() -> Self {
        Self {
            max_depth: Some(0),
            ..Self::default()
        }
    }
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: impl Into<PathBuf>, config: WalkerConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Start a fresh walk. Yields nothing when the root is not a directory.
    pub fn levels(&self) -> Levels {
        let pending = if self.root.is_dir() {
            vec![(self.root.clone(), LogicalPath::posix(""), 0)]
        } else {
            Vec::new()
        };

        Levels {
            pending,
            config: self.config.clone(),
        }
    }
}

impl IntoIterator for &Walker {
    type Item = Level;
    type IntoIter = Levels;

    fn into_iter(self) -> Levels {
        self.levels()
    }
}

/// Lazy iterator over the levels of one walk
pub struct Levels {
    pending: Vec<(PathBuf, LogicalPath, usize)>,
    config: WalkerConfig,
}

impl Levels {
    fn descends(&self, depth: usize) -> bool {
        self.config.max_depth.map_or(true, |max| depth < max)
    }
}

impl Iterator for Levels {
    type Item = Level;

    fn next(&mut self) -> Option<Level> {
        while let Some((directory, relative, depth)) = self.pending.pop() {
            match list(&directory, self.config.follow_symlinks) {
                Ok(listing) => {
                    if self.descends(depth) {
                        for name in listing.descend.iter().rev() {
                            let child_relative =
                                LogicalPath::posix("/").join(relative.as_str()).join(name);
                            self.pending.push((directory.join(name), child_relative, depth + 1));
                        }
                    }

                    trace!(
                        directory = %directory.display(),
                        directories = listing.directories.len(),
                        files = listing.files.len(),
                        "Walked level"
                    );

                    return Some(Level {
                        directory,
                        relative,
                        directories: listing.directories,
                        files: listing.files,
                        depth,
                    });
                }
                Err(e) => {
                    warn!(
                        directory = %directory.display(),
                        error = %e,
                        "Skipping unreadable directory"
                    );
                }
            }
        }

        None
    }
}

struct Listing {
    directories: Vec<String>,
    files: Vec<String>,
    descend: Vec<String>,
}

fn list(directory: &Path, follow_symlinks: bool) -> Result<Listing, walkdir::Error> {
    let mut listing = Listing {
        directories: Vec::new(),
        files: Vec::new(),
        descend: Vec::new(),
    };

    let entries = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(follow_symlinks)
        .sort_by_file_name();

    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            listing.descend.push(name.clone());
            listing.directories.push(name);
        } else if entry.path_is_symlink() && entry.path().is_dir() {
            listing.directories.push(name);
        } else {
            listing.files.push(name);
        }
    }

    Ok(listing)
}
