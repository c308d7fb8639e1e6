//! Merge rules: defaults, override order, conflict handling.

use crate::config::{
    default_block_size, default_checksum_algorithm, default_checksum_block_size,
    default_compare_ignore, default_hidden_patterns, default_max_conflict_attempts,
};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("files.block_size", default_block_size() as i64)?
        .set_default("files.checksum_block_size", default_checksum_block_size() as i64)?
        .set_default("files.checksum_algorithm", default_checksum_algorithm())?
        .set_default("files.hidden_patterns", default_hidden_patterns())?
        .set_default("files.compare_ignore", default_compare_ignore())?
        .set_default(
            "files.max_conflict_attempts",
            default_max_conflict_attempts() as i64,
        )
}
