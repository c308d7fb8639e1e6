//! Descendant listings: one record per directory level, filtered then mapped

use super::pattern::NameFilter;
use super::walker::{Levels, Walker};
use super::VirtualFile;
use crate::error::FileError;
use crate::path::LogicalPath;
use std::path::PathBuf;

/// How listed names are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Representation {
    /// The bare entry name
    #[default]
    Names,
    /// Relative to the listed directory, e.g. `a.txt` or `/sub/a.txt`
    Relatives,
    /// Logical path under the root, e.g. `/docs/sub/a.txt`
    Paths,
    /// Real path on disk
    Fulls,
    /// A [`VirtualFile`] sharing the lister's root
    Instances,
}

/// Options for [`VirtualFile::children`] and [`VirtualFile::siblings`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildrenOptions {
    /// Walk every level instead of stopping after the first one yielded
    pub recursive: bool,
    /// List directories and files apart. Forced when only one kind is requested.
    pub separate: bool,
    pub directories: bool,
    pub files: bool,
    /// Last level to yield, counted after `offset`
    pub limit: Option<usize>,
    /// Levels to skip before yielding
    pub offset: Option<usize>,
    /// Drop names matching one of `hidden`
    pub hide: bool,
    pub hidden: Vec<String>,
    /// Shell-style pattern a name must match whole
    pub glob: Option<String>,
    /// Regular expression a name must match from its start
    pub regex: Option<String>,
    pub representation: Representation,
}

impl Default for ChildrenOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            separate: false,
            directories: true,
            files: true,
            limit: None,
            offset: None,
            hide: false,
            hidden: vec![".*".to_string()],
            glob: None,
            regex: None,
            representation: Representation::Names,
        }
    }
}

/// One listed entry, in the requested [`Representation`]
#[derive(Debug, Clone)]
pub enum Descendant {
    Name(String),
    Relative(LogicalPath),
    Logical(LogicalPath),
    Full(PathBuf),
    File(VirtualFile),
}

impl Descendant {
    /// Textual form of the entry; logical path for instances
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Descendant::Name(name) => name.as_str().into(),
            Descendant::Relative(path) | Descendant::Logical(path) => path.as_str().into(),
            Descendant::Full(path) => path.to_string_lossy(),
            Descendant::File(file) => file.path().into(),
        }
    }
}

/// Entries of one level
#[derive(Debug, Clone)]
pub enum ListingContent {
    /// Directories first, then files
    Combined(Vec<Descendant>),
    /// Each kind is `None` when it was not requested
    Separate {
        directories: Option<Vec<Descendant>>,
        files: Option<Vec<Descendant>>,
    },
}

impl ListingContent {
    /// Every entry of the level, directories first
    pub fn entries(&self) -> Vec<&Descendant> {
        match self {
            ListingContent::Combined(entries) => entries.iter().collect(),
            ListingContent::Separate { directories, files } => directories
                .iter()
                .chain(files.iter())
                .flatten()
                .collect(),
        }
    }
}

/// One directory level of a listing
#[derive(Debug, Clone)]
pub struct Listing {
    /// The level's path relative to the listed directory: empty for the directory
    /// itself, otherwise rooted, as in `/sub/deeper`
    pub path: LogicalPath,
    pub content: ListingContent,
}

/// Lazy listing produced by [`VirtualFile::children`]
pub struct Children {
    bearer: VirtualFile,
    levels: Option<Levels>,
    filter: NameFilter,
    options: ChildrenOptions,
    offset_limit: Option<usize>,
    count: usize,
}

impl Children {
    fn new(bearer: VirtualFile, listable: bool, options: &ChildrenOptions) -> Result<Self, FileError> {
        let filter = NameFilter::new(
            options.hide,
            &options.hidden,
            options.glob.as_deref(),
            options.regex.as_deref(),
        )?;

        let offset = options.offset.filter(|&offset| offset > 0);
        let limit = options.limit.filter(|&limit| limit > 0);
        let offset_limit = match (limit, offset) {
            (Some(limit), Some(offset)) => Some(limit + offset),
            (limit, _) => limit,
        };

        let levels = listable.then(|| Walker::new(bearer.full_path()).levels());

        Ok(Self {
            bearer,
            levels,
            filter,
            options: ChildrenOptions {
                offset,
                limit,
                ..options.clone()
            },
            offset_limit,
            count: 0,
        })
    }

    fn render(&self, relative: &LogicalPath, names: &[String]) -> Vec<Descendant> {
        self.filter
            .apply(names)
            .into_iter()
            .map(|name| self.represent(relative, name))
            .collect()
    }

    fn represent(&self, relative: &LogicalPath, name: &str) -> Descendant {
        let representation = self.options.representation;
        if representation == Representation::Names {
            return Descendant::Name(name.to_string());
        }

        let relative = relative.join(name);
        if representation == Representation::Relatives {
            return Descendant::Relative(relative);
        }

        let logical = self.bearer.logical().join(relative.as_str());
        match representation {
            Representation::Instances => Descendant::File(self.bearer.instance(logical)),
            Representation::Fulls => Descendant::Full(self.bearer.full_of(&logical)),
            _ => Descendant::Logical(logical),
        }
    }
}

impl Iterator for Children {
    type Item = Listing;

    fn next(&mut self) -> Option<Listing> {
        loop {
            let level = self.levels.as_mut()?.next()?;
            self.count += 1;

            if self.options.offset.is_some_and(|offset| offset >= self.count) {
                continue;
            }

            if self.offset_limit.is_some_and(|last| last < self.count) {
                self.levels = None;
                return None;
            }

            let options = &self.options;
            let just_files = options.files && !options.directories;
            let just_directories = options.directories && !options.files;
            let separate = options.separate || just_files || just_directories;

            let content = if separate {
                ListingContent::Separate {
                    directories: options
                        .directories
                        .then(|| self.render(&level.relative, &level.directories)),
                    files: options
                        .files
                        .then(|| self.render(&level.relative, &level.files)),
                }
            } else {
                let mut names = level.directories;
                names.extend(level.files);
                ListingContent::Combined(self.render(&level.relative, &names))
            };

            if !self.options.recursive {
                self.levels = None;
            }

            return Some(Listing {
                path: level.relative,
                content,
            });
        }
    }
}

impl VirtualFile {
    /// List what lies beneath this directory, one [`Listing`] per level walked.
    ///
    /// Names are filtered (hidden patterns, then glob, then regex) before they are
    /// rendered. `offset` and `limit` count levels, not entries. A missing entry or a
    /// file lists nothing.
    pub fn children(&self, options: &ChildrenOptions) -> Result<Children, FileError> {
        Children::new(self.clone(), self.is_dir(), options)
    }

    /// [`VirtualFile::children`] of the parent directory
    pub fn siblings(&self, options: &ChildrenOptions) -> Result<Children, FileError> {
        let parent = self.parent();
        let listable = self.exists() && parent.is_dir();
        Children::new(parent, listable, options)
    }
}
