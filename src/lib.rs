//! Vroot: root-jailed virtual files
//!
//! Every file or directory is addressed by a POSIX-style logical path that is transparently
//! re-rooted beneath a real directory. A separator-aware path algebra does the string work;
//! [`VirtualFile`] layers traversal, aggregation, comparison and checksums on top of it.

pub mod archive;
pub mod checksum;
pub mod config;
pub mod directory;
pub mod error;
pub mod feed;
pub mod file;
pub mod logging;
pub mod path;

pub use checksum::{Checksum, Checksummer};
pub use config::{ConfigLoader, FileConfig, VrootConfig};
pub use error::{ConfigError, FileError};
pub use feed::{Feed, Strip};
pub use file::{
    Allowed, ChildrenOptions, CompareMethod, Comparison, CompressOptions, Content, CountOptions,
    Descendant, EntryCount, EqualityOptions, Listing, ListingContent, NamedStream, Overwrite,
    Properties, PropertyRequest, Representation, Tally, VirtualFile, VirtualFileBuilder,
    WriteOptions,
};
pub use path::{LogicalPath, PathLike, Separator, Side};
