//! Integration tests for layered configuration loading

use super::test_utils::{tree, with_env};
use vroot::{ConfigLoader, FileConfig, VirtualFile};

#[test]
fn test_workspace_file_and_environment() {
    let temp_dir = tree(&[
        ("xdg/", ""),
        (
            "workspace/vroot.toml",
            "[files]\nblock_size = 512\nchecksum_algorithm = \"sha1\"\n",
        ),
    ]);
    let xdg = temp_dir.path().join("xdg");
    let workspace = temp_dir.path().join("workspace");

    let config = with_env(
        &[
            ("XDG_CONFIG_HOME", xdg.to_str()),
            ("VROOT_ENV", None),
            ("VROOT__FILES__BLOCK_SIZE", Some("2048")),
        ],
        || ConfigLoader::load_validated(&workspace).unwrap(),
    );

    assert_eq!(config.files.block_size, 2048);
    assert_eq!(config.files.checksum_algorithm, "sha1");
    assert_eq!(config.files.checksum_block_size, FileConfig::default().checksum_block_size);
}

#[test]
fn test_environment_specific_workspace_file() {
    let temp_dir = tree(&[
        ("xdg/", ""),
        ("workspace/vroot.toml", "[files]\nmax_conflict_attempts = 5\n"),
        ("workspace/vroot.ci.toml", "[files]\nmax_conflict_attempts = 7\n"),
    ]);
    let xdg = temp_dir.path().join("xdg");
    let workspace = temp_dir.path().join("workspace");

    let config = with_env(
        &[
            ("XDG_CONFIG_HOME", xdg.to_str()),
            ("VROOT_ENV", Some("ci")),
            ("VROOT__FILES__BLOCK_SIZE", None),
        ],
        || ConfigLoader::load(&workspace).unwrap(),
    );

    assert_eq!(config.files.max_conflict_attempts, 7);
}

#[test]
fn test_invalid_workspace_file_is_rejected() {
    let temp_dir = tree(&[
        ("xdg/", ""),
        ("workspace/vroot.toml", "[files]\nchecksum_block_size = 0\n"),
    ]);
    let xdg = temp_dir.path().join("xdg");
    let workspace = temp_dir.path().join("workspace");

    let result = with_env(
        &[
            ("XDG_CONFIG_HOME", xdg.to_str()),
            ("VROOT_ENV", None),
            ("VROOT__FILES__BLOCK_SIZE", None),
        ],
        || ConfigLoader::load_validated(&workspace),
    );

    assert!(result.is_err());
}

/// Test that loaded settings flow into the files built from them
#[test]
fn test_loaded_config_drives_conflict_attempts() {
    let temp_dir = tree(&[("data/a.txt", "a"), ("data/a_1.txt", "1")]);
    let config = FileConfig {
        max_conflict_attempts: 1,
        ..FileConfig::default()
    };
    let file = VirtualFile::builder("/a.txt")
        .root(temp_dir.path().join("data"))
        .config(config)
        .build()
        .unwrap();

    assert!(file.resolve_conflict().is_err());
}
