//! Property-based tests for the path algebra

mod path_algebra;
