//! Configuration sources, lowest precedence first.

pub mod global_file;
pub mod workspace_file;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

/// Environment overrides: `VROOT__FILES__BLOCK_SIZE=4096` sets `files.block_size`.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("VROOT")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
