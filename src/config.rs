//! Configuration System
//!
//! Layered configuration for file handling and logging. Sources, lowest to highest
//! precedence: merge-policy defaults, the user's global config file, the workspace
//! config file(s), then `VROOT__*` environment variables.

use crate::checksum;
use crate::error::ConfigError;
use crate::file::pattern;
use crate::file::{ChildrenOptions, PropertyRequest};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

mod merge;
mod sources;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VrootConfig {
    /// File handling settings
    #[serde(default)]
    pub files: FileConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings shared by every [`crate::VirtualFile`] built from this configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Block length for streamed reads and writes
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Block length for checksum reads
    #[serde(default = "default_checksum_block_size")]
    pub checksum_block_size: usize,

    /// Algorithm used when none is named
    #[serde(default = "default_checksum_algorithm")]
    pub checksum_algorithm: String,

    /// Glob patterns treated as hidden when listing with `hide`
    #[serde(default = "default_hidden_patterns")]
    pub hidden_patterns: Vec<String>,

    /// Names skipped when comparing directory trees
    #[serde(default = "default_compare_ignore")]
    pub compare_ignore: Vec<String>,

    /// Upper bound on `<base>_<n><ext>` candidates tried by conflict resolution
    #[serde(default = "default_max_conflict_attempts")]
    pub max_conflict_attempts: usize,
}

pub(crate) fn default_block_size() -> usize {
    16 * 1024
}

pub(crate) fn default_checksum_block_size() -> usize {
    64 * 1024
}

pub(crate) fn default_checksum_algorithm() -> String {
    checksum::CRC32.to_string()
}

pub(crate) fn default_hidden_patterns() -> Vec<String> {
    vec![".*".to_string()]
}

pub(crate) fn default_compare_ignore() -> Vec<String> {
    ["RCS", "CVS", "tags", ".git", ".hg", ".bzr", "_darcs", "__pycache__"]
        .iter()
        .map(|name| name.to_string())
        .collect()
}

pub(crate) fn default_max_conflict_attempts() -> usize {
    10_000
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            block_size: default_block_size(),
            checksum_block_size: default_checksum_block_size(),
            checksum_algorithm: default_checksum_algorithm(),
            hidden_patterns: default_hidden_patterns(),
            compare_ignore: default_compare_ignore(),
            max_conflict_attempts: default_max_conflict_attempts(),
        }
    }
}

impl FileConfig {
    /// Validate file settings
    pub fn validate(&self) -> Result<(), String> {
        if self.block_size == 0 {
            return Err("block_size must be greater than zero".to_string());
        }
        if self.checksum_block_size == 0 {
            return Err("checksum_block_size must be greater than zero".to_string());
        }
        if self.max_conflict_attempts == 0 {
            return Err("max_conflict_attempts must be greater than zero".to_string());
        }
        if !checksum::is_supported(&self.checksum_algorithm) {
            return Err(format!(
                "Unsupported checksum algorithm '{}'",
                self.checksum_algorithm
            ));
        }
        for hidden in &self.hidden_patterns {
            pattern::glob(hidden).map_err(|e| format!("Hidden pattern '{}': {}", hidden, e))?;
        }

        Ok(())
    }

    /// Listing options that hide with the configured patterns
    pub fn children_options(&self) -> ChildrenOptions {
        ChildrenOptions {
            hidden: self.hidden_patterns.clone(),
            ..ChildrenOptions::default()
        }
    }

    /// Property request that checksums with the configured algorithm
    pub fn property_request(&self) -> PropertyRequest {
        PropertyRequest {
            checksums: vec![self.checksum_algorithm.clone()],
            ..PropertyRequest::default()
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Files(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Files(msg) => write!(f, "Files: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl VrootConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.files.validate() {
            errors.push(ValidationError::Files(e));
        }

        if let Err(e) = self.logging.validate() {
            errors.push(ValidationError::Logging(e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`VrootConfig`] from its layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace
    pub fn load(workspace_root: &Path) -> Result<VrootConfig, ConfigError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = sources::add_environment(builder);

        let config: VrootConfig = builder.build()?.try_deserialize()?;
        debug!(workspace = %workspace_root.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load configuration and reject invalid values
    pub fn load_validated(workspace_root: &Path) -> Result<VrootConfig, ConfigError> {
        let config = Self::load(workspace_root)?;
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ConfigError::Invalid(messages.join("\n"))
        })?;
        Ok(config)
    }

    /// Load configuration from a single file on top of the defaults
    pub fn load_from_file(path: &Path) -> Result<VrootConfig, ConfigError> {
        let config = merge::merge_policy::builder_with_defaults()?
            .add_source(config::File::from(path))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Path of the user-level config file, if a home or XDG directory is known
    pub fn global_config_path() -> Option<PathBuf> {
        sources::global_file::global_config_path()
    }

    /// Defaults only
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> VrootConfig {
        VrootConfig::default()
    }
}
