//! Integration tests for root-jailed virtual files


mod archive_roundtrip;
mod children_walk;
mod config_loading;
mod file_comparison;
mod path_algebra;
mod virtual_file;
mod write_resolution;
