//! Separator-aware path string algebra
//!
//! Pure string transformations over POSIX (`/`) or DOS (`\`) styled paths. Nothing in
//! this module touches the filesystem and nothing in it can fail. Both separator
//! characters are recognised on input; output only ever uses the path's own separator.
//!
//! Every transformation returns a fresh [`LogicalPath`]; callers that want the plain
//! string take it with [`LogicalPath::as_str`] or [`LogicalPath::into_string`].

use std::fmt;
use std::hash::{Hash, Hasher};
use unicode_normalization::UnicodeNormalization;

use crate::file::VirtualFile;

const POSIX_SEPARATOR: char = '/';
const DOS_SEPARATOR: char = '\\';
const SEPARATORS: [char; 2] = [POSIX_SEPARATOR, DOS_SEPARATOR];
const CURRENT_MARKER: &str = ".";
const PARENT_MARKER: &str = "..";
const EXTENSION_SEPARATOR: char = '.';

/// Separator style of a [`LogicalPath`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    /// `/`
    Posix,
    /// `\`
    Dos,
}

impl Separator {
    /// The host platform's separator style
    pub fn native() -> Self {
        if cfg!(windows) {
            Separator::Dos
        } else {
            Separator::Posix
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Separator::Posix => POSIX_SEPARATOR,
            Separator::Dos => DOS_SEPARATOR,
        }
    }
}

impl Default for Separator {
    fn default() -> Self {
        Self::native()
    }
}

/// Which end(s) of a path [`LogicalPath::strip`] trims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Both,
    Left,
    Right,
}

/// A path string bound to one separator style.
///
/// Equality is plain string equality of the stored text. No normalization happens on
/// comparison; normalize both sides first when canonical equality is wanted.
#[derive(Debug, Clone, Default)]
pub struct LogicalPath {
    path: String,
    separator: Separator,
}

impl LogicalPath {
    pub fn new(path: impl Into<String>, separator: Separator) -> Self {
        Self {
            path: path.into(),
            separator,
        }
    }

    /// A `/`-separated path
    pub fn posix(path: impl Into<String>) -> Self {
        Self::new(path, Separator::Posix)
    }

    /// A path using the host platform's separator
    pub fn native(path: impl Into<String>) -> Self {
        Self::new(path, Separator::native())
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn into_string(self) -> String {
        self.path
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// True when the path begins with either separator
    pub fn is_rooted(&self) -> bool {
        self.path.starts_with(SEPARATORS)
    }

    fn derive(&self, path: impl Into<String>) -> Self {
        Self::new(path, self.separator)
    }

    /// Join a single fragment onto this path. See [`LogicalPath::join_all`].
    pub fn join(&self, part: impl AsRef<str>) -> Self {
        self.join_all([part])
    }

    /// Join fragments onto this path with this path's separator.
    ///
    /// Empty fragments are ignored. Any fragment after the first has its leading
    /// separators removed instead of resetting to a root, and no separator is inserted
    /// after text that already ends in one, so doubled separators are never produced.
    pub fn join_all<I, S>(&self, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let separator = self.separator.as_char();
        let mut joined = self.path.clone();
        let mut first = joined.is_empty();

        for part in parts {
            let part = part.as_ref();
            if part.is_empty() {
                continue;
            }

            if first {
                joined.push_str(part);
                first = false;
                continue;
            }

            if !joined.ends_with(SEPARATORS) {
                joined.push(separator);
            }
            joined.push_str(part.trim_start_matches(SEPARATORS));
        }

        self.derive(joined)
    }

    /// Collapse `.`, resolve `..` and uniform separators
    pub fn normalize(&self) -> Self {
        self.normalize_with(true, true, false)
    }

    /// Normalize with explicit switches.
    ///
    /// * `collapse` drops `.` segments. Without it only separator runs are uniformed
    ///   into a single canonical separator.
    /// * `resolve` (with `collapse`) makes each `..` pop the most recently kept segment.
    ///   A `..` with nothing left to pop is dropped. Without it `..` is kept verbatim.
    /// * `absolute` forces a leading separator onto the result.
    ///
    /// Whether the input was rooted and whether it ended in a separator are carried over
    /// independently of segment filtering, so `/abc/../` becomes `/`.
    pub fn normalize_with(&self, collapse: bool, resolve: bool, absolute: bool) -> Self {
        let normal = if collapse {
            self.collapsed(resolve)
        } else {
            uniform(&self.path, self.separator)
        };

        if absolute {
            self.derive(self.planted(normal))
        } else {
            self.derive(normal)
        }
    }

    fn collapsed(&self, resolve: bool) -> String {
        let separator = self.separator.as_char();
        let rooted = self.is_rooted();
        let trailing = self.path.ends_with(SEPARATORS);

        let mut kept: Vec<String> = Vec::new();
        for segment in self.segments() {
            match segment.as_str() {
                "" | CURRENT_MARKER => {}
                PARENT_MARKER if resolve => {
                    kept.pop();
                }
                _ => kept.push(segment),
            }
        }

        let mut normal = String::with_capacity(self.path.len());
        if rooted {
            normal.push(separator);
        }
        normal.push_str(&kept.join(&separator.to_string()));
        if trailing && !kept.is_empty() {
            normal.push(separator);
        }
        normal
    }

    fn planted(&self, path: String) -> String {
        let separator = self.separator.as_char();
        if path.starts_with(separator) {
            path
        } else {
            self.derive(separator.to_string())
                .join(&path)
                .into_string()
        }
    }

    /// Remove separators of both styles from the requested side(s)
    pub fn strip(&self, side: Side) -> Self {
        let stripped = match side {
            Side::Both => self.path.trim_matches(SEPARATORS),
            Side::Left => self.path.trim_start_matches(SEPARATORS),
            Side::Right => self.path.trim_end_matches(SEPARATORS),
        };
        self.derive(stripped)
    }

    /// Split on separators of both styles.
    ///
    /// `Some(n)` right-strips the path, then splits at most `n` times from the right;
    /// `Some(1)` always yields exactly two elements, with an empty first element when
    /// there is no separator. `None` strips both ends and splits on every separator.
    /// Markers such as `..` are never collapsed here.
    pub fn split(&self, maximum: Option<usize>) -> Vec<String> {
        let side = if maximum.is_none() {
            Side::Both
        } else {
            Side::Right
        };
        let separator = self.separator.as_char();
        let uniformed = uniform(self.strip(side).as_str(), self.separator);

        let mut parts: Vec<String> = match maximum {
            None => uniformed.split(separator).map(String::from).collect(),
            Some(maximum) => {
                let mut parts: Vec<String> = uniformed
                    .rsplitn(maximum + 1, separator)
                    .map(String::from)
                    .collect();
                parts.reverse();
                parts
            }
        };

        if maximum == Some(1) && parts.len() == 1 {
            parts.insert(0, String::new());
        }

        parts
    }

    /// `(everything but the last segment, last segment)`
    pub fn split_pair(&self) -> (String, String) {
        let mut parts = self.split(Some(1));
        let name = parts.pop().unwrap_or_default();
        let ancestry = parts.pop().unwrap_or_default();
        (ancestry, name)
    }

    /// Every segment, both ends stripped
    pub fn segments(&self) -> Vec<String> {
        self.split(None)
    }

    /// Closest ASCII-only rendition: compatibility decomposition, then non-ASCII dropped.
    pub fn simplify(&self) -> Self {
        let simplified: String = self.path.nfkd().filter(char::is_ascii).collect();
        self.derive(simplified)
    }

    /// The path without its last segment
    pub fn parent(&self) -> Self {
        self.derive(self.split_pair().0)
    }

    /// The last segment
    pub fn name(&self) -> String {
        self.split_pair().1
    }

    /// The last segment split into `(base, extension)`; `.md` keeps its dot
    pub fn name_split(&self) -> (String, String) {
        self.extension_parts(false)
    }

    /// The last segment without its extension
    pub fn base(&self) -> String {
        self.name_split().0
    }

    /// The whole path without its extension, trailing separators removed
    pub fn base_full(&self) -> Self {
        let stripped = self.strip(Side::Right);
        self.derive(stripped.extension_parts(true).0)
    }

    /// The extension of the last segment, dot included, or empty
    pub fn extension(&self) -> String {
        self.name_split().1
    }

    /// Replace the extension of the last segment.
    ///
    /// Dots around `extension` are ignored, so `"md"`, `".md"` and `"md."` behave alike.
    /// An empty extension removes the current one.
    pub fn with_extension(&self, extension: &str) -> Self {
        let base = self.base_full();
        let bare = extension.trim_matches(EXTENSION_SEPARATOR);
        if bare.is_empty() {
            return base;
        }
        self.derive(format!("{}{}{}", base.path, EXTENSION_SEPARATOR, bare))
    }

    fn extension_parts(&self, full: bool) -> (String, String) {
        let (ancestry, name) = self.split_pair();
        let (name_base, extension) = split_extension(&name);

        if !full {
            return (name_base, extension);
        }

        let base = match (ancestry.is_empty(), name_base.is_empty()) {
            (false, false) => format!("{}{}{}", ancestry, self.separator.as_char(), name_base),
            (false, true) => ancestry,
            _ => name_base,
        };
        (base, extension)
    }
}

/// Split a bare file name into `(base, extension)`.
///
/// A name with a single leading dot and no other dot (`.MD`) is all extension.
/// Otherwise the extension starts at the last dot that has a non-dot character
/// somewhere before it.
pub fn split_extension(name: &str) -> (String, String) {
    if name.starts_with(EXTENSION_SEPARATOR) && name.matches(EXTENSION_SEPARATOR).count() == 1 {
        return (String::new(), name.to_string());
    }

    match name.rfind(EXTENSION_SEPARATOR) {
        Some(index) if name[..index].chars().any(|c| c != EXTENSION_SEPARATOR) => {
            (name[..index].to_string(), name[index..].to_string())
        }
        _ => (name.to_string(), String::new()),
    }
}

/// Replace every run of separators (either style) with one `separator`
fn uniform(path: &str, separator: Separator) -> String {
    let mut uniformed = String::with_capacity(path.len());
    let mut in_run = false;

    for c in path.chars() {
        if SEPARATORS.contains(&c) {
            if !in_run {
                uniformed.push(separator.as_char());
            }
            in_run = true;
        } else {
            uniformed.push(c);
            in_run = false;
        }
    }

    uniformed
}

impl PartialEq for LogicalPath {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for LogicalPath {}

impl Hash for LogicalPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl PartialEq<str> for LogicalPath {
    fn eq(&self, other: &str) -> bool {
        self.path == other
    }
}

impl PartialEq<&str> for LogicalPath {
    fn eq(&self, other: &&str) -> bool {
        self.path == *other
    }
}

impl PartialEq<String> for LogicalPath {
    fn eq(&self, other: &String) -> bool {
        &self.path == other
    }
}

impl fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl AsRef<str> for LogicalPath {
    fn as_ref(&self) -> &str {
        &self.path
    }
}

impl From<&str> for LogicalPath {
    fn from(path: &str) -> Self {
        Self::native(path)
    }
}

impl From<String> for LogicalPath {
    fn from(path: String) -> Self {
        Self::native(path)
    }
}

/// Anything a caller may hand over where a path is expected.
#[derive(Debug, Clone)]
pub enum PathLike {
    Text(String),
    Path(LogicalPath),
    File(Box<VirtualFile>),
}

impl PathLike {
    /// The path text; for a file this is its logical path
    pub fn as_str(&self) -> &str {
        match self {
            PathLike::Text(text) => text,
            PathLike::Path(path) => path.as_str(),
            PathLike::File(file) => file.path(),
        }
    }
}

impl From<&str> for PathLike {
    fn from(text: &str) -> Self {
        PathLike::Text(text.to_string())
    }
}

impl From<String> for PathLike {
    fn from(text: String) -> Self {
        PathLike::Text(text)
    }
}

impl From<&String> for PathLike {
    fn from(text: &String) -> Self {
        PathLike::Text(text.clone())
    }
}

impl From<LogicalPath> for PathLike {
    fn from(path: LogicalPath) -> Self {
        PathLike::Path(path)
    }
}

impl From<&LogicalPath> for PathLike {
    fn from(path: &LogicalPath) -> Self {
        PathLike::Path(path.clone())
    }
}

impl From<VirtualFile> for PathLike {
    fn from(file: VirtualFile) -> Self {
        PathLike::File(Box::new(file))
    }
}

impl From<&VirtualFile> for PathLike {
    fn from(file: &VirtualFile) -> Self {
        PathLike::File(Box::new(file.clone()))
    }
}
